// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Purchase hand-off: a WhatsApp deep link pre-filled with the product.
//!
//! No order is recorded; the sale continues in the chat.

use crate::models::Product;

const WHATSAPP_BASE: &str = "https://wa.me";

/// Format a whole-dollar price as `$45,000`.
pub fn format_price(price: f64) -> String {
    let whole = price.round().max(0.0) as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

/// Message sent to the shop for `product`.
pub fn purchase_message(product: &Product) -> String {
    format!(
        "Hello, I would like to purchase the following watch:\n\n\
         *Name:* {}\n\
         *Price:* {}\n\
         *Description:* {}\n\
         *Warranty:* {}\n\n\
         Please let me know the next steps. Thank you!",
        product.name,
        format_price(product.price),
        product.description,
        product.warranty
    )
}

/// Deep link opening a chat with `phone` and the purchase message filled in.
pub fn purchase_link(product: &Product, phone: &str) -> String {
    let phone: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE,
        phone,
        urlencoding::encode(&purchase_message(product))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Gift};

    fn product() -> Product {
        Product {
            key: "p1".into(),
            name: "Royal Oak".into(),
            category: Category::Luxury,
            price: 45000.0,
            description: "Steel & blue dial".into(),
            warranty: "2 years".into(),
            images: vec![],
            bullet_points: vec![],
            gift: Gift::default(),
            is_new: false,
            num_reviews_to_show: 5,
            reviews: vec![],
        }
    }

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(45000.0), "$45,000");
        assert_eq!(format_price(1234567.0), "$1,234,567");
    }

    #[test]
    fn test_link_encodes_message() {
        let link = purchase_link(&product(), "+1 (555) 555-0100");

        assert!(link.starts_with("https://wa.me/15555550100?text="));
        assert!(link.contains("Royal%20Oak"));
        assert!(link.contains("%2445%2C000"));
        assert!(link.contains("Steel%20%26%20blue%20dial"));
        assert!(!link[WHATSAPP_BASE.len()..].contains(' '));
    }

    #[test]
    fn test_message_template() {
        assert_eq!(
            purchase_message(&product()),
            "Hello, I would like to purchase the following watch:\n\n\
             *Name:* Royal Oak\n\
             *Price:* $45,000\n\
             *Description:* Steel & blue dial\n\
             *Warranty:* 2 years\n\n\
             Please let me know the next steps. Thank you!"
        );
    }
}
