//! Inventory, expenses and the financial summary

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{Expense, FinancialSummary, InventoryInput, InventoryItem, Order};
use sqlx::PgPool;

pub async fn list_items(pool: &PgPool, restaurant_id: i64) -> Result<Vec<InventoryItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM inventory WHERE restaurant_id = $1 ORDER BY item")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

/// Insert with defaults for unit, state and threshold. `item` is required by the caller.
pub async fn create_item(
    pool: &PgPool,
    restaurant_id: i64,
    item: &str,
    input: &InventoryInput,
) -> Result<InventoryItem, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO inventory (
            restaurant_id, item, quantity, unit, state, threshold, rate,
            total_price, supplier_name, supplier_number, date_received
        )
        VALUES (
            $1, $2, COALESCE($3, 0), COALESCE($4, 'kg'), COALESCE($5, 'Available'),
            COALESCE($6, 0), $7, $8, $9, $10, $11
        )
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(item)
    .bind(input.quantity)
    .bind(&input.unit)
    .bind(&input.state)
    .bind(input.threshold)
    .bind(input.rate)
    .bind(input.total_price)
    .bind(&input.supplier_name)
    .bind(&input.supplier_number)
    .bind(input.date_received)
    .fetch_one(pool)
    .await
}

/// Partial update: absent fields keep their value.
pub async fn update_item(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    input: &InventoryInput,
) -> Result<Option<InventoryItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE inventory SET
            item = COALESCE($1, item),
            quantity = COALESCE($2, quantity),
            unit = COALESCE($3, unit),
            state = COALESCE($4, state),
            threshold = COALESCE($5, threshold),
            rate = COALESCE($6, rate),
            total_price = COALESCE($7, total_price),
            supplier_name = COALESCE($8, supplier_name),
            supplier_number = COALESCE($9, supplier_number),
            date_received = COALESCE($10, date_received)
        WHERE id = $11 AND restaurant_id = $12
        RETURNING *
        "#,
    )
    .bind(&input.item)
    .bind(input.quantity)
    .bind(&input.unit)
    .bind(&input.state)
    .bind(input.threshold)
    .bind(input.rate)
    .bind(input.total_price)
    .bind(&input.supplier_name)
    .bind(&input.supplier_number)
    .bind(input.date_received)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_item(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM inventory WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Expenses ──

/// Validated expense fields
#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub description: String,
    pub amount: Decimal,
    pub total_paid: Decimal,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub phone_number: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

pub async fn list_expenses(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM expenses WHERE restaurant_id = $1 ORDER BY expense_date DESC, id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn create_expense(
    pool: &PgPool,
    restaurant_id: i64,
    e: &ExpenseFields,
) -> Result<Expense, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO expenses (
            restaurant_id, description, amount, total_paid, paid_by, paid_to,
            phone_number, expense_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, CURRENT_DATE))
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(&e.description)
    .bind(e.amount)
    .bind(e.total_paid)
    .bind(&e.paid_by)
    .bind(&e.paid_to)
    .bind(&e.phone_number)
    .bind(e.expense_date)
    .fetch_one(pool)
    .await
}

pub async fn update_expense(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    e: &ExpenseFields,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE expenses SET
            description = $1, amount = $2, total_paid = $3, paid_by = $4,
            paid_to = $5, phone_number = $6, expense_date = COALESCE($7, expense_date)
        WHERE id = $8 AND restaurant_id = $9
        RETURNING *
        "#,
    )
    .bind(&e.description)
    .bind(e.amount)
    .bind(e.total_paid)
    .bind(&e.paid_by)
    .bind(&e.paid_to)
    .bind(&e.phone_number)
    .bind(e.expense_date)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_expense(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Financials ──

/// Paid orders in the (inclusive, local-date) range, newest first
pub async fn cash_in(
    pool: &PgPool,
    restaurant_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = $1 AND is_paid AND order_date::date BETWEEN $2 AND $3
        ORDER BY order_date DESC, id DESC
        "#,
    )
    .bind(restaurant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn cash_out(
    pool: &PgPool,
    restaurant_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM expenses
        WHERE restaurant_id = $1 AND expense_date BETWEEN $2 AND $3
        ORDER BY expense_date DESC, id DESC
        "#,
    )
    .bind(restaurant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// Totals over already fetched rows
pub fn summarize(cash_in: &[Order], cash_out: &[Expense]) -> FinancialSummary {
    let total_sales: Decimal = cash_in.iter().map(|o| o.total_amount).sum();
    let total_expenses: Decimal = cash_out.iter().map(|e| e.amount).sum();
    FinancialSummary {
        total_sales,
        total_expenses,
        net_profit: total_sales - total_expenses,
        order_count: cash_in.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order(total: i64) -> Order {
        Order {
            id: 1,
            restaurant_id: 1,
            bill_no: 1,
            table_number: None,
            table_category_id: None,
            customer_name: None,
            customer_phone: None,
            customer_email: None,
            delivery_type: "takeaway".into(),
            payment_type: Some("cash".into()),
            total_amount: Decimal::from(total),
            is_paid: true,
            is_opted_in: false,
            status: "delivered".into(),
            staff_id: None,
            order_date: Utc::now(),
            accepted_at: None,
            served_at: None,
        }
    }

    fn expense(amount: i64) -> Expense {
        Expense {
            id: 1,
            restaurant_id: 1,
            description: "Vegetables".into(),
            amount: Decimal::from(amount),
            total_paid: Decimal::from(amount),
            paid_by: None,
            paid_to: None,
            phone_number: None,
            expense_date: Utc::now().date_naive(),
        }
    }

    #[test]
    fn summary_totals() {
        let summary = summarize(&[order(300), order(200)], &[expense(120)]);
        assert_eq!(summary.total_sales, Decimal::from(500));
        assert_eq!(summary.total_expenses, Decimal::from(120));
        assert_eq!(summary.net_profit, Decimal::from(380));
        assert_eq!(summary.order_count, 2);
    }

    #[test]
    fn empty_summary() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.net_profit, Decimal::ZERO);
        assert_eq!(summary.order_count, 0);
    }
}
