// catalog_kit/src/model/normalize.rs

//! The single ingestion boundary between remote JSON and the canonical model.
//!
//! Backends (and older exports of the same backend) spell fields differently:
//! `Name`, `name`, `Nombre`; `categoryId`, `category_id`, `{"category": {"id": ..}}`.
//! Everything is resolved here once; the rest of the crate only sees
//! [`Product`], [`Category`] and [`Brand`].

use super::id::{number_to_string, EntityId};
use super::product::{Product, ProductPage, SpecEntry, MAX_PRODUCT_IMAGES};
use super::taxonomy::{Brand, Category};
use crate::error::{CatalogError, CatalogResult};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "_id"];
const NAME_KEYS: &[&str] = &["name", "nombre", "title"];
const PRODUCT_NAME_KEYS: &[&str] = &["name", "nombre", "producto", "productName", "title"];
const CODE_KEYS: &[&str] = &["code", "codigo", "sku"];
const COMMERCIAL_CODE_KEYS: &[&str] = &["commercialCode", "codigoComercial", "codComercial"];
const CATEGORY_ID_KEYS: &[&str] = &["categoryId", "categoriaId", "idCategoria"];
const CATEGORY_OBJECT_KEYS: &[&str] = &["category", "categoria"];
const CATEGORY_NAME_KEYS: &[&str] = &["categoryName", "categoriaNombre", "nombreCategoria"];
const BRAND_ID_KEYS: &[&str] = &["brandId", "marcaId", "idMarca"];
const BRAND_OBJECT_KEYS: &[&str] = &["brand", "marca"];
const BRAND_NAME_KEYS: &[&str] = &["brandName", "marcaNombre", "nombreMarca"];
const IMAGE_LIST_KEYS: &[&str] = &["images", "imagenes", "imageUrls"];
const IMAGE_SLOT_PREFIXES: &[&str] = &["image", "imagen", "img", "imageUrl"];
const ACTIVE_KEYS: &[&str] = &["active", "isActive", "activo", "estado"];
const SPEC_KEYS: &[&str] = &["specSheet", "specs", "specifications", "fichaTecnica", "especificaciones"];
const LIST_KEYS: &[&str] = &["items", "data", "products", "productos", "results", "rows"];
const TOTAL_KEYS: &[&str] = &["total", "totalCount", "totalItems", "count"];
const MESSAGE_KEYS: &[&str] = &["message", "error", "detail", "mensaje", "title"];
const SPEC_LABEL_KEYS: &[&str] = &["label", "name", "key", "nombre", "titulo"];
const SPEC_VALUE_KEYS: &[&str] = &["value", "valor", "detail", "descripcion"];

/// Lowercases, drops separators and folds Spanish accents, so that
/// `Category_Id`, `categoryid` and `CATEGORY-ID` compare equal.
pub fn normalize_key(key: &str) -> String {
  key
    .chars()
    .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
    .map(fold_accent)
    .flat_map(char::to_lowercase)
    .collect()
}

/// Maps accented vowels and `ñ` to their plain counterparts.
pub fn fold_accent(c: char) -> char {
  match c {
    'á' | 'à' | 'ä' | 'â' => 'a',
    'Á' | 'À' | 'Ä' | 'Â' => 'A',
    'é' | 'è' | 'ë' | 'ê' => 'e',
    'É' | 'È' | 'Ë' | 'Ê' => 'E',
    'í' | 'ì' | 'ï' | 'î' => 'i',
    'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
    'ó' | 'ò' | 'ö' | 'ô' => 'o',
    'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
    'ú' | 'ù' | 'ü' | 'û' => 'u',
    'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
    'ñ' => 'n',
    'Ñ' => 'N',
    other => other,
  }
}

/// Alias-aware view over a JSON object.
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
  fn of(value: &'a Value) -> Option<Self> {
    value.as_object().map(Fields)
  }

  fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
      if let Some(v) = self.0.get(*alias) {
        if !v.is_null() {
          return Some(v);
        }
      }
    }
    let wanted: Vec<String> = aliases.iter().map(|a| normalize_key(a)).collect();
    self
      .0
      .iter()
      .find(|(k, v)| !v.is_null() && wanted.contains(&normalize_key(k)))
      .map(|(_, v)| v)
  }

  fn text(&self, aliases: &[&str]) -> Option<String> {
    self.get(aliases).and_then(scalar_text)
  }

  fn id(&self, aliases: &[&str]) -> Option<EntityId> {
    self.get(aliases).and_then(EntityId::from_json)
  }

  fn flag(&self, aliases: &[&str]) -> Option<bool> {
    self.get(aliases).and_then(scalar_flag)
  }

  fn nested(&self, aliases: &[&str]) -> Option<Fields<'a>> {
    self.get(aliases).and_then(Fields::of)
  }
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.trim().to_string()),
    Value::Number(n) => Some(number_to_string(n)),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

fn scalar_flag(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_f64().map(|f| f != 0.0),
    Value::String(s) => match normalize_key(s).as_str() {
      "true" | "1" | "si" | "yes" | "activo" | "active" => Some(true),
      "false" | "0" | "no" | "inactivo" | "inactive" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

/// Converts one remote product payload into a [`Product`].
pub fn product_from_value(value: &Value) -> CatalogResult<Product> {
  let fields = Fields::of(value).ok_or_else(|| CatalogError::Decode(format!("product is not an object: {}", value)))?;
  let id = fields
    .id(&["id", "_id", "productId", "idProducto"])
    .ok_or_else(|| CatalogError::Decode("product without id".to_string()))?;

  let category = fields.nested(CATEGORY_OBJECT_KEYS);
  let brand = fields.nested(BRAND_OBJECT_KEYS);

  let category_id = fields
    .id(CATEGORY_ID_KEYS)
    .or_else(|| category.as_ref().and_then(|c| c.id(ID_KEYS)))
    .or_else(|| scalar_reference(&fields, CATEGORY_OBJECT_KEYS));
  let brand_id = fields
    .id(BRAND_ID_KEYS)
    .or_else(|| brand.as_ref().and_then(|b| b.id(ID_KEYS)))
    .or_else(|| scalar_reference(&fields, BRAND_OBJECT_KEYS));

  let category_name = fields
    .text(CATEGORY_NAME_KEYS)
    .or_else(|| category.as_ref().and_then(|c| c.text(NAME_KEYS)))
    .filter(|s| !s.is_empty());
  let brand_name = fields
    .text(BRAND_NAME_KEYS)
    .or_else(|| brand.as_ref().and_then(|b| b.text(NAME_KEYS)))
    .filter(|s| !s.is_empty());

  Ok(Product {
    id,
    name: fields.text(PRODUCT_NAME_KEYS).unwrap_or_default(),
    code: fields.text(CODE_KEYS).unwrap_or_default(),
    commercial_code: fields.text(COMMERCIAL_CODE_KEYS).unwrap_or_default(),
    category_id,
    brand_id,
    category_name,
    brand_name,
    images: images_from_fields(&fields),
    active: fields.flag(ACTIVE_KEYS).unwrap_or(true),
    spec_sheet: fields.get(SPEC_KEYS).map(parse_spec_sheet).unwrap_or_default(),
  })
}

// `"category": 3` used as a plain foreign key rather than an embedded object.
fn scalar_reference(fields: &Fields<'_>, aliases: &[&str]) -> Option<EntityId> {
  match fields.get(aliases) {
    Some(v @ Value::Number(_)) => EntityId::from_json(v),
    _ => None,
  }
}

fn images_from_fields(fields: &Fields<'_>) -> Vec<String> {
  let mut images: Vec<String> = Vec::new();
  if let Some(Value::Array(list)) = fields.get(IMAGE_LIST_KEYS) {
    for item in list {
      let url = match item {
        Value::Object(_) => Fields::of(item).and_then(|f| f.text(&["url", "src", "path"])),
        other => scalar_text(other),
      };
      if let Some(url) = url.filter(|u| !u.is_empty()) {
        images.push(url);
      }
    }
  }
  if images.is_empty() {
    for slot in 1..=MAX_PRODUCT_IMAGES {
      let aliases: Vec<String> = IMAGE_SLOT_PREFIXES.iter().map(|p| format!("{}{}", p, slot)).collect();
      let alias_refs: Vec<&str> = aliases.iter().map(String::as_str).collect();
      if let Some(url) = fields.text(&alias_refs).filter(|u| !u.is_empty()) {
        images.push(url);
      }
    }
  }
  images.truncate(MAX_PRODUCT_IMAGES);
  images
}

/// Parses a spec sheet from any of the shapes seen in the wild: a list of
/// `{label, value}` objects, a list of `[label, value]` pairs, an object map,
/// a JSON-encoded string of one of those, or free text with `label: value` lines.
pub fn parse_spec_sheet(value: &Value) -> Vec<SpecEntry> {
  match value {
    Value::Array(items) => items.iter().filter_map(spec_entry_from_item).collect(),
    Value::Object(map) => map
      .iter()
      .filter_map(|(k, v)| scalar_text(v).map(|text| SpecEntry::new(k.trim(), text)))
      .collect(),
    Value::String(text) => {
      let trimmed = text.trim();
      if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
          return parse_spec_sheet(&parsed);
        }
      }
      trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
          Some((label, value)) => SpecEntry::new(label.trim(), value.trim()),
          None => SpecEntry::new(line, ""),
        })
        .collect()
    }
    _ => Vec::new(),
  }
}

fn spec_entry_from_item(item: &Value) -> Option<SpecEntry> {
  match item {
    Value::Object(_) => {
      let fields = Fields::of(item)?;
      let label = fields.text(SPEC_LABEL_KEYS).filter(|l| !l.is_empty())?;
      Some(SpecEntry::new(label, fields.text(SPEC_VALUE_KEYS).unwrap_or_default()))
    }
    Value::Array(pair) if !pair.is_empty() => {
      let label = scalar_text(&pair[0]).filter(|l| !l.is_empty())?;
      let value = pair.get(1).and_then(scalar_text).unwrap_or_default();
      Some(SpecEntry::new(label, value))
    }
    _ => None,
  }
}

/// Extracts the list payload: either a bare array or an array under a known key.
pub fn list_from_value(value: &Value) -> CatalogResult<&Vec<Value>> {
  if let Value::Array(list) = value {
    return Ok(list);
  }
  Fields::of(value)
    .and_then(|f| f.get(LIST_KEYS))
    .and_then(Value::as_array)
    .ok_or_else(|| CatalogError::Decode("expected a list of records".to_string()))
}

/// Converts a paginated product response into a [`ProductPage`].
/// When the payload carries no total, the number of items is used.
pub fn product_page_from_value(value: &Value) -> CatalogResult<ProductPage> {
  let items = list_from_value(value)?
    .iter()
    .map(product_from_value)
    .collect::<CatalogResult<Vec<_>>>()?;
  let total = Fields::of(value)
    .and_then(|f| f.get(TOTAL_KEYS))
    .and_then(Value::as_u64)
    .map(|t| t as usize)
    .unwrap_or(items.len());
  Ok(ProductPage { items, total })
}

fn taxon_from_value(value: &Value, kind: &str) -> CatalogResult<(EntityId, String)> {
  let fields = Fields::of(value).ok_or_else(|| CatalogError::Decode(format!("{} is not an object: {}", kind, value)))?;
  let id = fields
    .id(ID_KEYS)
    .ok_or_else(|| CatalogError::Decode(format!("{} without id", kind)))?;
  Ok((id, fields.text(NAME_KEYS).unwrap_or_default()))
}

pub fn category_from_value(value: &Value) -> CatalogResult<Category> {
  let (id, name) = taxon_from_value(value, "category")?;
  Ok(Category { id, name })
}

pub fn brand_from_value(value: &Value) -> CatalogResult<Brand> {
  let (id, name) = taxon_from_value(value, "brand")?;
  Ok(Brand { id, name })
}

pub fn categories_from_value(value: &Value) -> CatalogResult<Vec<Category>> {
  list_from_value(value)?.iter().map(category_from_value).collect()
}

pub fn brands_from_value(value: &Value) -> CatalogResult<Vec<Brand>> {
  list_from_value(value)?.iter().map(brand_from_value).collect()
}

/// Human-readable message from an error body, if the backend sent one.
pub fn message_from_value(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Object(_) => Fields::of(value)
      .and_then(|f| f.text(MESSAGE_KEYS))
      .filter(|m| !m.is_empty()),
    _ => None,
  }
}
