//! Chat message formatting (Telegram-style HTML subset)

use serde::{Deserialize, Serialize};
use shared::models::{Inquiry, Order};
use std::fmt::Write;

/// Event forwarded to the staff chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum NotificationPayload {
    Order(Order),
    Inquiry(Inquiry),
}

impl NotificationPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Order(_) => "order",
            Self::Inquiry(_) => "inquiry",
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Order(order) => format_order(order),
            Self::Inquiry(inquiry) => format_inquiry(inquiry),
        }
    }
}

/// Escape the three characters the chat HTML parser reserves
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0} ₽")
    } else {
        format!("{value:.2} ₽")
    }
}

pub fn format_order(order: &Order) -> String {
    let mut text = format!("🛒 <b>Новый заказ</b> #{}\n\n", order.id);
    for (i, item) in order.items.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} (<code>{}</code>) × {} = {}",
            i + 1,
            escape_html(&item.name),
            escape_html(&item.part_number),
            item.quantity,
            money(item.line_total())
        );
    }
    let _ = writeln!(text, "\n<b>Итого:</b> {}", money(order.total));

    let c = &order.customer;
    let _ = writeln!(text, "\n👤 {}", escape_html(&c.name));
    let _ = writeln!(text, "📞 {}", escape_html(&c.phone));
    if let Some(email) = &c.email {
        let _ = writeln!(text, "✉️ {}", escape_html(email));
    }
    if let Some(comment) = c.comment.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(text, "💬 {}", escape_html(comment));
    }
    text.trim_end().to_string()
}

pub fn format_inquiry(inquiry: &Inquiry) -> String {
    let mut text = String::from("❓ <b>Новый запрос</b>\n\n");
    if let Some(product) = &inquiry.product_name {
        let _ = writeln!(text, "<b>Товар:</b> {}", escape_html(product));
    }
    if let Some(price) = inquiry.proposed_price {
        let _ = writeln!(text, "<b>Предложенная цена:</b> {}", money(price));
    }
    let _ = writeln!(text, "\n👤 {}", escape_html(&inquiry.customer_name));
    let _ = writeln!(text, "📞 {}", escape_html(&inquiry.phone));
    if let Some(email) = &inquiry.email {
        let _ = writeln!(text, "✉️ {}", escape_html(email));
    }
    if let Some(message) = inquiry.message.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(text, "💬 {}", escape_html(message));
    }
    text.trim_end().to_string()
}
