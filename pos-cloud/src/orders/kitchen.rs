//! Kitchen display projection
//!
//! The store returns one row per (unpaid order, line). Rows are folded into
//! tickets keeping only the unserved remainder of each line; tickets with
//! nothing left to cook are dropped.

use chrono::{DateTime, Utc};
use shared::models::{KitchenItem, KitchenTicket};

/// Flat row of the kitchen query (LEFT JOIN of orders and their lines)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KitchenRow {
    pub order_id: i64,
    pub bill_no: i64,
    pub table_number: Option<String>,
    pub category_name: Option<String>,
    pub waiter_name: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub accepted_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
    pub item_name: Option<String>,
    pub quantity: Option<i32>,
    pub quantity_served: Option<i32>,
}

impl KitchenRow {
    fn outstanding(&self) -> Option<KitchenItem> {
        let name = self.item_name.as_ref()?;
        let remaining = self.quantity.unwrap_or(0) - self.quantity_served.unwrap_or(0);
        (remaining > 0).then(|| KitchenItem {
            name: name.clone(),
            quantity: remaining,
        })
    }

    fn ticket(&self) -> KitchenTicket {
        KitchenTicket {
            id: self.order_id,
            bill_no: self.bill_no,
            table_number: self.table_number.clone(),
            category_name: self.category_name.clone(),
            waiter_name: self.waiter_name.clone(),
            placed_time: self.order_date,
            status: self.status.clone(),
            accepted_time: self.accepted_at,
            served_time: self.served_at,
            items: Vec::new(),
        }
    }
}

/// Fold rows into tickets, preserving the row order of orders.
///
/// Rows of one order must be adjacent (the query orders by order first).
pub fn project(rows: Vec<KitchenRow>) -> Vec<KitchenTicket> {
    let mut tickets: Vec<KitchenTicket> = Vec::new();

    for row in rows {
        let item = row.outstanding();
        match tickets.last_mut() {
            Some(last) if last.id == row.order_id => last.items.extend(item),
            _ => {
                let mut ticket = row.ticket();
                ticket.items.extend(item);
                tickets.push(ticket);
            }
        }
    }

    tickets.retain(|t| !t.items.is_empty());
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_id: i64, item: Option<(&str, i32, i32)>) -> KitchenRow {
        KitchenRow {
            order_id,
            bill_no: order_id * 10,
            table_number: Some("5".into()),
            category_name: Some("AC Hall".into()),
            waiter_name: None,
            order_date: Utc::now(),
            status: "pending".into(),
            accepted_at: None,
            served_at: None,
            item_name: item.map(|(n, _, _)| n.to_owned()),
            quantity: item.map(|(_, q, _)| q),
            quantity_served: item.map(|(_, _, s)| s),
        }
    }

    #[test]
    fn only_unserved_remainder_is_shown() {
        let tickets = project(vec![
            row(1, Some(("Paneer Tikka", 3, 1))),
            row(1, Some(("Dal", 2, 2))),
        ]);
        assert_eq!(tickets.len(), 1);
        assert_eq!(
            tickets[0].items,
            vec![KitchenItem {
                name: "Paneer Tikka".into(),
                quantity: 2
            }]
        );
        assert_eq!(tickets[0].bill_no, 10);
    }

    #[test]
    fn fully_served_orders_are_dropped() {
        let tickets = project(vec![
            row(1, Some(("Dal", 2, 2))),
            row(2, Some(("Naan", 4, 0))),
            row(3, None),
        ]);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, 2);
        assert_eq!(tickets[0].items[0].quantity, 4);
    }

    #[test]
    fn order_of_tickets_is_kept() {
        let tickets = project(vec![
            row(7, Some(("A", 1, 0))),
            row(7, Some(("B", 1, 0))),
            row(3, Some(("C", 2, 0))),
        ]);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert_eq!(tickets[0].items.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(project(Vec::new()).is_empty());
    }
}
