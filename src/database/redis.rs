use log::info;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

/// Redis connection wrapper
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    pub async fn init(redis_url: &str) -> Result<Self, String> {
        let client =
            Client::open(redis_url).map_err(|e| format!("Failed to create Redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))?;

        info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Server-side registry of issued session tokens, so a sign-out revokes the
/// token before its JWT expiry.
#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub fn new(client: &RedisClient) -> Self {
        Self {
            connection: client.get_connection(),
        }
    }

    /// Register a freshly issued token. Every live token of the user is kept
    /// in `sessions:{user_id}` so logout can revoke all of them.
    pub async fn store_session(
        &self,
        user_id: &str,
        token: &str,
        expiry_seconds: u64,
    ) -> Result<(), String> {
        let mut conn = self.connection.clone();
        let set_key = sessions_key(user_id);

        conn.set_ex::<_, _, ()>(token_key(token), user_id, expiry_seconds)
            .await
            .map_err(|e| format!("Failed to store token mapping: {}", e))?;

        conn.sadd::<_, _, ()>(&set_key, token)
            .await
            .map_err(|e| format!("Failed to store session: {}", e))?;
        // the set lives as long as the newest token
        conn.expire::<_, ()>(&set_key, expiry_seconds as i64)
            .await
            .map_err(|e| format!("Failed to store session: {}", e))?;

        Ok(())
    }

    /// Returns the user id the token was issued to, if it is still live.
    pub async fn validate_session(&self, token: &str) -> Result<Option<String>, String> {
        let mut conn = self.connection.clone();

        conn.get(token_key(token))
            .await
            .map_err(|e| format!("Failed to validate session: {}", e))
    }

    /// Revoke every token issued to the user (logout)
    pub async fn invalidate_session(&self, user_id: &str) -> Result<(), String> {
        let mut conn = self.connection.clone();

        let tokens: Vec<String> = conn
            .smembers(sessions_key(user_id))
            .await
            .map_err(|e| format!("Failed to get sessions: {}", e))?;

        conn.del::<_, ()>(revocation_keys(user_id, &tokens))
            .await
            .map_err(|e| format!("Failed to delete sessions: {}", e))?;

        info!("revoked {} session(s) for {}", tokens.len(), user_id);
        Ok(())
    }
}

fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

fn sessions_key(user_id: &str) -> String {
    format!("sessions:{}", user_id)
}

/// Keys removed on logout: one mapping per issued token plus the user's set.
fn revocation_keys(user_id: &str, tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| token_key(t))
        .chain(std::iter::once(sessions_key(user_id)))
        .collect()
}

pub async fn connect_to_redis(redis_url: &str) -> Result<RedisClient, String> {
    RedisClient::init(redis_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_revokes_every_issued_token() {
        let tokens = vec!["first".to_string(), "second".to_string()];
        let keys = revocation_keys("u1", &tokens);

        assert_eq!(
            keys,
            vec![
                "token:first".to_string(),
                "token:second".to_string(),
                "sessions:u1".to_string(),
            ]
        );
    }

    #[test]
    fn logout_without_sessions_clears_the_set() {
        assert_eq!(revocation_keys("u1", &[]), vec!["sessions:u1".to_string()]);
    }
}
