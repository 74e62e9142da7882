// catalog_kit/src/import/fields.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A target field of the import, to which a spreadsheet column can be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SystemField {
  #[serde(rename = "codigo")]
  Code,
  #[serde(rename = "codigoComercial")]
  CommercialCode,
  #[serde(rename = "producto")]
  ProductName,
  #[serde(rename = "marca")]
  Brand,
  #[serde(rename = "categoria")]
  Category,
}

impl SystemField {
  /// Display order.
  pub const ALL: [SystemField; 5] = [
    SystemField::Code,
    SystemField::CommercialCode,
    SystemField::ProductName,
    SystemField::Brand,
    SystemField::Category,
  ];

  /// Most specific first, so "Código Comercial" is claimed before plain "Código" can take it.
  pub const INFERENCE_ORDER: [SystemField; 5] = [
    SystemField::CommercialCode,
    SystemField::Code,
    SystemField::ProductName,
    SystemField::Brand,
    SystemField::Category,
  ];

  pub fn key(self) -> &'static str {
    match self {
      SystemField::Code => "codigo",
      SystemField::CommercialCode => "codigoComercial",
      SystemField::ProductName => "producto",
      SystemField::Brand => "marca",
      SystemField::Category => "categoria",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SystemField::Code => "Código",
      SystemField::CommercialCode => "Código Comercial",
      SystemField::ProductName => "Producto",
      SystemField::Brand => "Marca",
      SystemField::Category => "Categoría",
    }
  }

  pub fn required(self) -> bool {
    !matches!(self, SystemField::CommercialCode)
  }

  /// Header keywords, already lowercased and without accents. Tried in order.
  pub fn keywords(self) -> &'static [&'static str] {
    match self {
      SystemField::Code => &["codigo", "code", "sku", "cod"],
      SystemField::CommercialCode => &["codigo comercial", "cod comercial", "comercial", "commercial"],
      SystemField::ProductName => &["producto", "product", "nombre", "descripcion", "name"],
      SystemField::Brand => &["marca", "brand", "fabricante"],
      SystemField::Category => &["categoria", "category", "rubro", "familia"],
    }
  }

  /// Row error when a required field is blank.
  pub fn empty_error(self) -> Option<&'static str> {
    match self {
      SystemField::Code => Some("Código vacío"),
      SystemField::ProductName => Some("Producto vacío"),
      SystemField::Brand => Some("Marca vacía"),
      SystemField::Category => Some("Categoría vacía"),
      SystemField::CommercialCode => None,
    }
  }

  pub fn from_key(key: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|f| f.key().eq_ignore_ascii_case(key.trim()))
  }
}

impl fmt::Display for SystemField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_commercial_code_is_optional() {
    let optional: Vec<_> = SystemField::ALL.into_iter().filter(|f| !f.required()).collect();
    assert_eq!(optional, vec![SystemField::CommercialCode]);
  }

  #[test]
  fn keys_round_trip() {
    for field in SystemField::ALL {
      assert_eq!(SystemField::from_key(field.key()), Some(field));
    }
    assert_eq!(SystemField::from_key("CODIGOCOMERCIAL"), Some(SystemField::CommercialCode));
  }
}
