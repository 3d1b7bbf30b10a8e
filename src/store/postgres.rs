//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{AddressStore, CartStore, CatalogStore, FavoriteStore, OrderStore, TicketStore};
use crate::{
    domain::{
        aggregates::{
            Address, Cart, Order, OrderItem, OrderStatus, PaymentMethod, Product, Ticket,
            TicketStatus,
        },
        value_objects::Quantity,
    },
    error::{Result, StoreError},
};

#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }
}

fn decode_err<E>(e: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Storage(sqlx::Error::Decode(Box::new(e)))
}

fn db_quantity(q: Quantity) -> Result<i32> {
    i32::try_from(q.value()).map_err(|_| StoreError::InvalidQuantity)
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    amount: Decimal,
    address_id: Uuid,
    payment_method: String,
    is_paid: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            amount: self.amount,
            address_id: self.address_id,
            payment_method: self.payment_method.parse::<PaymentMethod>().map_err(decode_err)?,
            is_paid: self.is_paid,
            status: self.status.parse::<OrderStatus>().map_err(decode_err)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    subject: String,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self> {
        Ok(Ticket {
            id: row.id,
            user_id: row.user_id,
            subject: row.subject,
            message: row.message,
            status: row.status.parse::<TicketStatus>().map_err(decode_err)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgStore {
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, quantity FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let quantity = Quantity::from_signed(i64::from(row.quantity)).ok_or(StoreError::InvalidQuantity)?;
            items.entry(row.order_id).or_default().push(OrderItem { product: row.product_id, quantity });
        }

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.db)
            .await?)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await?)
    }

    async fn insert_product(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, name, author, description, category, price, offer_price, in_stock, popular, images, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)")
            .bind(p.id).bind(&p.name).bind(&p.author).bind(&p.description).bind(&p.category)
            .bind(p.price).bind(p.offer_price).bind(p.in_stock).bind(p.popular).bind(&p.images)
            .bind(p.created_at).bind(p.updated_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_product(&self, p: &Product) -> Result<bool> {
        let done = sqlx::query("UPDATE products SET name = $2, author = $3, description = $4, category = $5, price = $6, offer_price = $7, in_stock = $8, popular = $9, images = $10, updated_at = $11 WHERE id = $1")
            .bind(p.id).bind(&p.name).bind(&p.author).bind(&p.description).bind(&p.category)
            .bind(p.price).bind(p.offer_price).bind(p.in_stock).bind(p.popular).bind(&p.images)
            .bind(p.updated_at)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn load_cart(&self, user: Uuid) -> Result<Cart> {
        let rows: Vec<(Uuid, i32)> =
            sqlx::query_as("SELECT product_id, quantity FROM cart_items WHERE user_id = $1")
                .bind(user)
                .fetch_all(&self.db)
                .await?;
        Ok(Cart::from_entries(rows.into_iter().map(|(id, q)| (id, i64::from(q)))))
    }

    async fn save_cart(&self, user: Uuid, cart: &Cart) -> Result<()> {
        let mut products = Vec::with_capacity(cart.line_count());
        let mut quantities = Vec::with_capacity(cart.line_count());
        for (id, q) in cart.entries() {
            products.push(id);
            quantities.push(db_quantity(q)?);
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user)
            .execute(&mut *tx)
            .await?;
        if !products.is_empty() {
            sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) SELECT $1, p, q FROM UNNEST($2::uuid[], $3::int4[]) AS t(p, q)")
                .bind(user)
                .bind(&products)
                .bind(&quantities)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AddressStore for PgStore {
    async fn insert_address(&self, a: &Address) -> Result<()> {
        sqlx::query("INSERT INTO addresses (id, user_id, first_name, last_name, email, phone, street, city, state, zipcode, country, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)")
            .bind(a.id).bind(a.user_id).bind(&a.first_name).bind(&a.last_name).bind(&a.email)
            .bind(&a.phone).bind(&a.street).bind(&a.city).bind(&a.state).bind(&a.zipcode)
            .bind(&a.country).bind(a.created_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn list_addresses(&self, user: Uuid) -> Result<Vec<Address>> {
        Ok(sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user)
            .fetch_all(&self.db)
            .await?)
    }

    async fn get_address(&self, id: Uuid) -> Result<Option<Address>> {
        Ok(sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn addresses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Address>> {
        Ok(sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await?)
    }
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn toggle_favorite(&self, user: Uuid, product: Uuid) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user)
            .bind(product)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            sqlx::query("INSERT INTO favorites (user_id, product_id) VALUES ($1, $2)")
                .bind(user)
                .bind(product)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(removed == 0)
    }

    async fn favorite_products(&self, user: Uuid) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT p.* FROM favorites f JOIN products p ON p.id = f.product_id WHERE f.user_id = $1 ORDER BY f.created_at DESC")
            .bind(user)
            .fetch_all(&self.db)
            .await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn place_order(&self, o: &Order) -> Result<()> {
        let positions: Vec<i32> = (0..).take(o.items.len()).collect();
        let products: Vec<Uuid> = o.items.iter().map(|i| i.product).collect();
        let quantities = o.items.iter().map(|i| db_quantity(i.quantity)).collect::<Result<Vec<i32>>>()?;

        let mut tx = self.db.begin().await?;
        sqlx::query("INSERT INTO orders (id, user_id, amount, address_id, payment_method, is_paid, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
            .bind(o.id).bind(o.user_id).bind(o.amount).bind(o.address_id)
            .bind(o.payment_method.as_str()).bind(o.is_paid).bind(o.status.as_str())
            .bind(o.created_at).bind(o.updated_at)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO order_items (order_id, position, product_id, quantity) SELECT $1, pos, p, q FROM UNNEST($2::int4[], $3::uuid[], $4::int4[]) AS t(pos, p, q)")
            .bind(o.id)
            .bind(&positions)
            .bind(&products)
            .bind(&quantities)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(o.user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_all(&self.db)
            .await?;
        Ok(self.attach_items(rows).await?.pop())
    }

    async fn list_orders(&self, user: Option<Uuid>) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE ($1::uuid IS NULL OR user_id = $1) AND (payment_method = 'COD' OR is_paid) ORDER BY created_at DESC, id DESC")
            .bind(user)
            .fetch_all(&self.db)
            .await?;
        self.attach_items(rows).await
    }

    async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        let done = sqlx::query("UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, t: &Ticket) -> Result<()> {
        sqlx::query("INSERT INTO tickets (id, user_id, subject, message, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(t.id).bind(t.user_id).bind(&t.subject).bind(&t.message)
            .bind(t.status.as_str()).bind(t.created_at).bind(t.updated_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn list_tickets(&self, user: Uuid) -> Result<Vec<Ticket>> {
        sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(Ticket::try_from)
            .collect()
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool> {
        let done = sqlx::query("UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_ticket(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM tickets WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(done.rows_affected() > 0)
    }
}
