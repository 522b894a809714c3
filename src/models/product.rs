use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub name: String,
    pub stock: i64,
}

impl Size {
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub sizes: Vec<Size>,
}

impl Product {
    pub fn formatted_price(&self) -> String {
        format_price(self.price)
    }
}

/// Formats a price the way the `tr-TR` locale does: `.` groups thousands,
/// `,` separates at most three fraction digits, trailing zeros dropped.
pub fn format_price(price: f64) -> String {
    // Past ~1.8e305 the scaled value overflows; such prices have no fraction left to round.
    let scaled = price * 1000.0;
    let rounded = if scaled.is_finite() {
        scaled.round() / 1000.0
    } else {
        price
    };
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut formatted = String::new();
    if rounded < 0.0 {
        formatted.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(ch);
    }
    if !frac_part.is_empty() {
        formatted.push(',');
        formatted.push_str(frac_part);
    }
    formatted.push_str(" ₺");
    formatted
}

/// One size row of the product form, kept as the raw text the admin typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeDraft {
    pub name: String,
    pub stock: String,
}

impl Default for SizeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            stock: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    Name,
    Stock,
}

/// The in-progress new-product form. Nothing here touches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub image: String,
    pub price: String,
    pub sizes: Vec<SizeDraft>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            price: "0".to_string(),
            sizes: vec![SizeDraft::default()],
        }
    }
}

/// A validated draft, ready to receive an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub sizes: Vec<Size>,
}

impl NewProduct {
    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            image: self.image,
            price: self.price,
            sizes: self.sizes,
        }
    }
}

impl ProductDraft {
    pub fn add_size(&mut self) {
        self.sizes.push(SizeDraft::default());
    }

    pub fn remove_size(&mut self, index: usize) {
        if index < self.sizes.len() {
            self.sizes.remove(index);
        }
    }

    pub fn edit_size(&mut self, index: usize, field: SizeField, value: impl Into<String>) {
        let Some(size) = self.sizes.get_mut(index) else {
            return;
        };
        match field {
            SizeField::Name => size.name = value.into(),
            SizeField::Stock => size.stock = value.into(),
        }
    }

    /// Checks every field and returns either the typed product or one message
    /// per offending field.
    pub fn validate(&self) -> Result<NewProduct, HashMap<String, String>> {
        let mut errors = HashMap::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name".to_string(), "Ürün adı gerekli".to_string());
        }

        let image = self.image.trim();
        if image.is_empty() {
            errors.insert("image".to_string(), "Görsel URL gerekli".to_string());
        } else if Url::parse(image).is_err() {
            errors.insert("image".to_string(), "Geçerli bir URL giriniz".to_string());
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            _ => {
                errors.insert("price".to_string(), "Fiyat 0 veya daha büyük olmalı".to_string());
                0.0
            }
        };

        let mut sizes = Vec::with_capacity(self.sizes.len());
        if self.sizes.is_empty() {
            errors.insert("sizes".to_string(), "En az bir beden ekleyin".to_string());
        }
        for size in &self.sizes {
            let size_name = size.name.trim();
            if size_name.is_empty() {
                errors.insert("sizes".to_string(), "Beden adı boş olamaz".to_string());
            }
            match size.stock.trim().parse::<i64>() {
                Ok(stock) if stock >= 0 => sizes.push(Size {
                    name: size_name.to_string(),
                    stock,
                }),
                _ => {
                    errors.insert(
                        "stock".to_string(),
                        "Stok 0 veya daha büyük bir tam sayı olmalı".to_string(),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProduct {
            name: name.to_string(),
            image: image.to_string(),
            price,
            sizes,
        })
    }
}
