use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// One-time login code for the guest auth flow. Overwrites any
    /// previous code for the same contact.
    pub async fn set_otp(&self, contact: &str, code: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("otp:{}", contact);
        conn.set_ex(key, code, ttl_seconds).await
    }

    pub async fn get_otp(&self, contact: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("otp:{}", contact);
        conn.get(key).await
    }

    /// Consumed codes are deleted so they cannot be replayed.
    pub async fn del_otp(&self, contact: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("otp:{}", contact);
        conn.del(key).await
    }

    pub async fn set_session(
        &self,
        session_id: &str,
        customer_id: &str,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("session:{}", session_id);
        conn.set_ex(key, customer_id, ttl_seconds).await
    }

    pub async fn get_session(&self, session_id: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("session:{}", session_id);
        conn.get(key).await
    }

    /// Fixed-window counter. INCR and EXPIRE run in one atomic pipe so
    /// the window always gets a TTL.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // INCR and EXPIRE each produce a reply, so the pipe returns a
        // two-element bulk.
        let (count, _): (i64, i64) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

#[cfg(test)]
mod tests {
    use redis::{FromRedisValue, RedisResult, Value};

    #[test]
    fn rate_limit_pipe_reply_parses_both_values() {
        let reply = Value::Array(vec![Value::Int(3), Value::Int(1)]);

        let (count, _): (i64, i64) = FromRedisValue::from_redis_value(reply.clone()).unwrap();
        assert_eq!(count, 3);

        // A 1-tuple rejects the two-element bulk outright, which would
        // turn every rate-limit check into an error.
        let short: Result<(i64,), redis::ParsingError> =
            FromRedisValue::from_redis_value(reply);
        assert!(short.is_err());
    }
}
