//! [`CacheStore`] implementation over SQLite.
//!
//! Namespaces are rows in `caches`; entries cascade with their namespace.

use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::store::{CacheKey, CacheStore, CachedEntry};
use crate::Error;
use crate::http::Response;

/// Raw entry columns before decoding.
type EntryRow = (String, String, u16, String, String, Vec<u8>, String);

fn insert_namespace(conn: &rusqlite::Connection, namespace: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
        params![namespace, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn upsert_entry(conn: &rusqlite::Connection, namespace: &str, entry: &CachedEntry) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.response.headers)
        .map_err(|e| Error::CorruptEntry(format!("headers for {}: {e}", entry.key)))?;

    conn.execute(
        "INSERT INTO entries (
            cache_name, key_hash, method, url, status, status_text,
            headers_json, body, captured_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            captured_at = excluded.captured_at",
        params![
            namespace,
            entry.key.hash(),
            &entry.key.method,
            &entry.key.url,
            entry.response.status,
            &entry.response.status_text,
            headers_json,
            &entry.response.body[..],
            entry.captured_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ],
    )?;
    Ok(())
}

fn decode_entry(row: EntryRow) -> Result<CachedEntry, Error> {
    let (method, url, status, status_text, headers_json, body, captured_at) = row;

    let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
        .map_err(|e| Error::CorruptEntry(format!("headers for {method} {url}: {e}")))?;
    let captured_at = DateTime::parse_from_rfc3339(&captured_at)
        .map_err(|e| Error::CorruptEntry(format!("captured_at for {method} {url}: {e}")))?
        .with_timezone(&Utc);

    Ok(CachedEntry {
        key: CacheKey { method, url },
        response: Response { status, status_text, headers, body: body.into() },
        captured_at,
    })
}

#[async_trait::async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { insert_namespace(conn, &namespace) })
            .await
            .map_err(Error::from)
    }

    async fn namespaces(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let prefix = prefix.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM caches
                    WHERE substr(name, 1, length(?1)) = ?1
                    ORDER BY name",
                )?;
                let names = stmt
                    .query_map(params![prefix], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![namespace])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        let namespace = namespace.to_string();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, status_text, headers_json, body, captured_at
                    FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![namespace, hash], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                });

                match result {
                    Ok(row) => decode_entry(row).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, namespace: &str, entry: CachedEntry) -> Result<(), Error> {
        self.put_all(namespace, vec![entry]).await
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CachedEntry>) -> Result<(), Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                insert_namespace(&tx, &namespace)?;
                for entry in &entries {
                    upsert_entry(&tx, &namespace, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, namespace: &str, key: &CacheKey) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![namespace, hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<CacheKey>, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CacheKey>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE cache_name = ?1 ORDER BY url, method")?;
                let keys = stmt
                    .query_map(params![namespace], |row| Ok(CacheKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_entry(url: &str, body: &'static str) -> CachedEntry {
        CachedEntry::capture(
            CacheKey::new("GET", url),
            Response::new(200, body).with_header("content-type", "text/plain"),
        )
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_entry("https://example.com/app.js", "console.log(1)");

        db.put("static-cache-v1", entry.clone()).await.unwrap();

        let got = db.get("static-cache-v1", &entry.key).await.unwrap().unwrap();
        assert_eq!(got, entry);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let got = db
            .get("static-cache-v1", &CacheKey::new("GET", "https://example.com/"))
            .await
            .unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_get_is_namespace_scoped() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_entry("https://example.com/", "home");
        db.put("dynamic-cache-v1", entry.clone()).await.unwrap();

        assert!(db.get("static-cache-v1", &entry.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_snapshot() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut old = make_entry("https://example.com/api/data", "old");
        old.captured_at = Utc::now() - Duration::minutes(10);
        db.put("dynamic-cache-v1", old.clone()).await.unwrap();

        let new = make_entry("https://example.com/api/data", "new");
        db.put("dynamic-cache-v1", new.clone()).await.unwrap();

        let got = db.get("dynamic-cache-v1", &old.key).await.unwrap().unwrap();
        assert_eq!(&got.response.body[..], b"new");
        assert_eq!(got.captured_at, new.captured_at);
        assert_eq!(db.keys("dynamic-cache-v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_namespace_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_entry("https://example.com/a.png", "png");
        db.put("image-cache-v1", entry.clone()).await.unwrap();

        assert!(db.delete_namespace("image-cache-v1").await.unwrap());
        assert!(!db.delete_namespace("image-cache-v1").await.unwrap());

        db.open("image-cache-v1").await.unwrap();
        assert!(db.get("image-cache-v1", &entry.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_namespaces_prefix_is_literal() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["static-cache-v1", "static_cache_x", "dynamic-cache-v1"] {
            db.open(name).await.unwrap();
        }

        assert_eq!(db.namespaces("static-cache-").await.unwrap(), vec!["static-cache-v1"]);
        assert_eq!(
            db.namespaces("").await.unwrap(),
            vec!["dynamic-cache-v1", "static-cache-v1", "static_cache_x"]
        );
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_all(
            "static-cache-v1",
            vec![make_entry("https://example.com/b.css", "b"), make_entry("https://example.com/a.js", "a")],
        )
        .await
        .unwrap();

        let keys = db.keys("static-cache-v1").await.unwrap();
        let urls: Vec<&str> = keys.iter().map(|k| k.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/a.js", "https://example.com/b.css"]);

        assert!(db.delete("static-cache-v1", &keys[0]).await.unwrap());
        assert_eq!(db.keys("static-cache-v1").await.unwrap().len(), 1);
    }
}
