use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::{NewOrder, Order, OrderStatus};
use diner_types::ports::dish_repository::DishRepository;
use diner_types::ports::order_repository::OrderRepository;
use diner_types::ports::RepoError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbDish {
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    category: String,
}

impl From<DbDish> for Dish {
    fn from(row: DbDish) -> Self {
        Dish {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
        }
    }
}

#[derive(FromRow)]
struct DbOrder {
    id: i64,
    customer_name: String,
    order_time: String,
    status: String,
}

#[derive(FromRow)]
struct DbOrderDish {
    order_id: i64,
    #[sqlx(flatten)]
    dish: DbDish,
}

impl DbOrder {
    fn into_order(self, dishes: Vec<Dish>) -> Result<Order, RepoError> {
        let status = OrderStatus::from_str(&self.status).map_err(db_err)?;
        let order_time = DateTime::parse_from_rfc3339(&self.order_time)
            .map_err(db_err)?
            .with_timezone(&Utc);
        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            order_time,
            status,
            dishes,
        })
    }
}

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::DbError(e.to_string())
}

/// Maps foreign key failures to [`RepoError::Conflict`], everything else to `DbError`.
fn write_err(e: sqlx::Error, conflict: impl FnOnce() -> String) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepoError::Conflict(conflict())
        }
        _ => db_err(e),
    }
}

const DISH_COLUMNS: &str = "id, name, description, price, category";

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_menu.sql");
        pool.execute(ddl).await?;
        tracing::debug!(database_url, "sqlite schema ready");

        Ok(Self { pool })
    }

    async fn dishes_of(conn: &mut SqliteConnection, order_id: i64) -> Result<Vec<Dish>, RepoError> {
        let rows: Vec<DbDish> = sqlx::query_as(
            "SELECT d.id, d.name, d.description, d.price, d.category
             FROM dishes d JOIN order_dish od ON od.dish_id = d.id
             WHERE od.order_id = ? ORDER BY d.id",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Dish::from).collect())
    }
}

#[async_trait]
impl DishRepository for SqliteRepo {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, RepoError> {
        let res = sqlx::query(
            "INSERT INTO dishes (name, description, price, category) VALUES (?, ?, ?, ?)",
        )
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price)
        .bind(&dish.category)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(dish.into_dish(res.last_insert_rowid()))
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RepoError> {
        let rows: Vec<DbDish> =
            sqlx::query_as(&format!("SELECT {DISH_COLUMNS} FROM dishes ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(Dish::from).collect())
    }

    async fn find_dishes(&self, ids: &BTreeSet<i64>) -> Result<Vec<Dish>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id IN ("));
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        sep.push_unseparated(") ORDER BY id");
        let rows: Vec<DbDish> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Dish::from).collect())
    }

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let row: Option<DbDish> =
            sqlx::query_as(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let in_use: Option<i64> =
            sqlx::query_scalar("SELECT order_id FROM order_dish WHERE dish_id = ? LIMIT 1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        if let Some(order_id) = in_use {
            return Err(RepoError::Conflict(format!(
                "dish {id} is referenced by order {order_id}"
            )));
        }
        // The foreign key still catches a link inserted after the check above.
        sqlx::query("DELETE FROM dishes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_err(e, || format!("dish {id} is referenced by an existing order")))?;
        tx.commit().await.map_err(db_err)?;
        Ok(Some(row.into()))
    }
}

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let res = sqlx::query("INSERT INTO orders (customer_name, order_time, status) VALUES (?, ?, ?)")
            .bind(&order.customer_name)
            .bind(order.order_time.to_rfc3339())
            .bind(OrderStatus::InProcessing.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let id = res.last_insert_rowid();

        for dish in &order.dishes {
            sqlx::query("INSERT INTO order_dish (order_id, dish_id) VALUES (?, ?)")
                .bind(id)
                .bind(dish.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| write_err(e, || format!("dish {} does not exist", dish.id)))?;
        }
        // Dropping the transaction on an early return rolls the order row back.
        tx.commit().await.map_err(db_err)?;
        Ok(order.into_order(id))
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let row: Option<DbOrder> = sqlx::query_as(
            "SELECT id, customer_name, order_time, status FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let dishes = Self::dishes_of(&mut conn, id).await?;
        row.into_order(dishes).map(Some)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let rows: Vec<DbOrder> =
            sqlx::query_as("SELECT id, customer_name, order_time, status FROM orders ORDER BY id")
                .fetch_all(&mut *tx)
                .await
                .map_err(db_err)?;
        let links: Vec<DbOrderDish> = sqlx::query_as(
            "SELECT od.order_id, d.id, d.name, d.description, d.price, d.category
             FROM order_dish od JOIN dishes d ON d.id = od.dish_id
             ORDER BY od.order_id, d.id",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        let mut by_order: HashMap<i64, Vec<Dish>> = HashMap::new();
        for link in links {
            by_order
                .entry(link.order_id)
                .or_default()
                .push(link.dish.into());
        }
        rows.into_iter()
            .map(|r| {
                let dishes = by_order.remove(&r.id).unwrap_or_default();
                r.into_order(dishes)
            })
            .collect::<Result<Vec<_>, _>>()
    }

    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        let updated = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_order(id).await
    }

    async fn delete_order(&self, id: i64, expected: OrderStatus) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = ? AND status = ?")
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
