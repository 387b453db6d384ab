use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::validation::format_minor_units;

/// What the buyer receives after paying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Link(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Minor currency units (kopecks for RUB).
    pub price: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub artifact: Artifact,
}

fn default_currency() -> String {
    "RUB".to_string()
}

impl Product {
    pub fn price_display(&self) -> String {
        format!("{} {}", format_minor_units(self.price), self.currency)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// Immutable product list, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for p in &products {
            if p.id.is_empty() || p.id.contains(':') {
                return Err(CatalogError::InvalidProductId(p.id.clone()));
            }
            if !seen.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateProduct(p.id.clone()));
            }
        }
        Ok(Self { products })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.products)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Catalog used when no catalog file is configured.
    pub fn builtin() -> Self {
        let product = |id: &str, name: &str, price: i64, artifact: Artifact| Product {
            id: id.to_string(),
            name: name.to_string(),
            price,
            currency: default_currency(),
            artifact,
        };
        Self {
            products: vec![
                product(
                    "bot_course",
                    "Course: How to build a bot",
                    19900,
                    Artifact::File(PathBuf::from("files/bot_course.zip")),
                ),
                product(
                    "pdf_guide",
                    "PDF guide",
                    9900,
                    Artifact::File(PathBuf::from("files/pdf_guide.pdf")),
                ),
                product(
                    "combo",
                    "Bundle: Course + Guide",
                    24900,
                    Artifact::File(PathBuf::from("files/combo.zip")),
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}
