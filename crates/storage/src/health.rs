use serde::Serialize;
use utoipa::ToSchema;

use crate::pool::ScorePool;
use crate::schema::SchemaInitializer;

/// Liveness signal for the store. Building one never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthStatus {
    pub reachable: bool,
    pub schema_ready: bool,
    pub detail: String,
    /// Pool connections open at the time of the check, idle or lent out.
    pub open_connections: u32,
    pub idle_connections: usize,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.schema_ready
    }
}

enum Observed {
    Ready,
    SchemaMissing(String),
    Unreachable(String),
}

/// Round-trip to the store and look the `scores` relation up in the catalog.
pub async fn check(pool: &ScorePool, schema: &SchemaInitializer) -> HealthStatus {
    let observed = observe(pool, schema).await;

    let (reachable, schema_ready, detail) = match observed {
        Observed::Ready => (true, true, "ok".to_string()),
        Observed::SchemaMissing(detail) => (true, false, detail),
        Observed::Unreachable(detail) => (false, false, format!("store unreachable: {detail}")),
    };

    HealthStatus {
        reachable,
        schema_ready,
        detail,
        open_connections: pool.size(),
        idle_connections: pool.num_idle(),
    }
}

async fn observe(pool: &ScorePool, schema: &SchemaInitializer) -> Observed {
    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Observed::Unreachable(e.to_string()),
    };

    let relation = sqlx::query_scalar::<_, Option<String>>("SELECT to_regclass('scores')::text")
        .fetch_one(&mut *conn)
        .await;

    match relation {
        Ok(Some(_)) => {
            conn.release();
            Observed::Ready
        }
        Ok(None) => {
            conn.release();
            let reason = schema
                .last_error()
                .unwrap_or_else(|| "relation 'scores' does not exist yet".to_string());
            Observed::SchemaMissing(format!("schema not ready: {reason}"))
        }
        Err(e) => {
            let error = conn.fail("health_check", e).await;
            if error.is_transient() {
                Observed::Unreachable(error.to_string())
            } else {
                Observed::SchemaMissing(error.to_string())
            }
        }
    }
}
