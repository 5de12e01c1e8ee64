//! Connection pool diagnostics reported alongside each probe

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Database connection pool metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabasePoolHealth {
    /// Total number of connections in the pool
    pub size: u32,

    /// Number of idle connections available
    pub idle: usize,

    /// Maximum pool size configured
    pub max_size: u32,

    /// Pool utilization percentage (0-100)
    pub utilization_percent: f32,
}

impl DatabasePoolHealth {
    pub fn new(size: u32, idle: usize, max_size: u32) -> Self {
        let utilization_percent = if max_size > 0 {
            ((size as f32 / max_size as f32) * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            size,
            idle,
            max_size,
            utilization_percent,
        }
    }

    /// Create metrics from a PostgreSQL pool
    #[cfg(feature = "database")]
    pub fn from_pool(pool: &sqlx::PgPool) -> Self {
        Self::new(pool.size(), pool.num_idle(), pool.options().get_max_connections())
    }

    /// Key/values for a probe report
    pub fn into_data(self) -> Vec<(String, Value)> {
        vec![
            ("pool_size".to_string(), Value::from(self.size)),
            ("idle_connections".to_string(), Value::from(self.idle)),
            ("max_connections".to_string(), Value::from(self.max_size)),
            (
                "utilization_percent".to_string(),
                Value::from(format!("{:.1}", self.utilization_percent)),
            ),
        ]
    }
}

/// Redis connection pool metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisPoolHealth {
    /// Connections currently held by the pool
    pub size: usize,

    /// Connections ready to be handed out
    pub available: usize,

    /// Maximum pool size configured
    pub max_size: usize,
}

impl RedisPoolHealth {
    /// Create metrics from a Redis pool
    #[cfg(feature = "cache")]
    pub fn from_pool(pool: &deadpool_redis::Pool) -> Self {
        let status = pool.status();
        Self {
            size: status.size,
            available: status.available,
            max_size: status.max_size,
        }
    }

    /// Key/values for a probe report
    pub fn into_data(self) -> Vec<(String, Value)> {
        vec![
            ("pool_size".to_string(), Value::from(self.size)),
            ("available_connections".to_string(), Value::from(self.available)),
            ("max_connections".to_string(), Value::from(self.max_size)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_utilization() {
        let health = DatabasePoolHealth::new(5, 2, 10);
        assert_eq!(health.utilization_percent, 50.0);

        let empty = DatabasePoolHealth::new(0, 0, 0);
        assert_eq!(empty.utilization_percent, 0.0);
    }

    #[test]
    fn test_database_data_keys() {
        let data = DatabasePoolHealth::new(4, 1, 8).into_data();
        let keys: Vec<_> = data.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(
            keys,
            vec!["pool_size", "idle_connections", "max_connections", "utilization_percent"]
        );
        assert_eq!(data[3].1, Value::from("50.0"));
    }

    #[test]
    fn test_redis_data() {
        let data = RedisPoolHealth {
            size: 3,
            available: 2,
            max_size: 16,
        }
        .into_data();

        assert_eq!(data[1], ("available_connections".to_string(), Value::from(2)));
        assert_eq!(data[2].1, Value::from(16));
    }
}
