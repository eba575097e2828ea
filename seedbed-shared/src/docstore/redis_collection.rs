/// Redis-backed cat collection
///
/// # Key Layout
///
/// All keys live under the collection namespace `<database>:<collection>`:
///
/// ```text
/// {ns}:seq            INCR counter, gives every insert a position
/// {ns}:order          ZSET  id -> position   (collection membership, insertion order)
/// {ns}:name:{name}    ZSET  id -> position   (natural-key index, first match = lowest score)
/// {ns}:doc:{id}       HASH  name, age, features (JSON array)
/// ```
///
/// Every operation that reads before it writes runs as a single Lua script,
/// so the document matched is always the document modified.
///
/// # Example
///
/// ```no_run
/// use seedbed_shared::docstore::client::{DocStoreClient, DocStoreConfig};
/// use seedbed_shared::docstore::{CatCollection, NewCat, RedisCatCollection};
///
/// # async fn example() -> Result<(), seedbed_shared::StoreError> {
/// let client = DocStoreClient::connect(DocStoreConfig::from_env()).await?;
/// let cats = RedisCatCollection::new(client);
///
/// let id = cats.insert(NewCat::new("barsik", 3, ["rudy"])).await?;
/// let counts = cats.set_age("barsik", 4).await?;
/// assert_eq!(counts.modified, 1);
/// # Ok(())
/// # }
/// ```

use super::cat::{CatCollection, CatDocument, CatId, NewCat, UpdateCounts};
use super::client::DocStoreClient;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use redis::Script;
use tracing::debug;
use uuid::Uuid;

/// Documents fetched per round trip while streaming the collection
const PAGE_SIZE: usize = 100;

/// KEYS: seq, order, name index, doc. ARGV: id, name, age, features JSON.
const INSERT_LUA: &str = r#"
local position = redis.call('INCR', KEYS[1])
redis.call('HSET', KEYS[4], 'name', ARGV[2], 'age', ARGV[3], 'features', ARGV[4])
redis.call('ZADD', KEYS[2], position, ARGV[1])
redis.call('ZADD', KEYS[3], position, ARGV[1])
return position
"#;

/// KEYS: name index. ARGV: doc prefix.
const FIND_ONE_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, 0)
if #ids == 0 then
    return false
end
local doc = redis.call('HMGET', ARGV[1] .. ids[1], 'name', 'age', 'features')
return {ids[1], doc[1], doc[2], doc[3]}
"#;

/// KEYS: order. ARGV: doc prefix, start, stop.
const PAGE_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], ARGV[2], ARGV[3])
local docs = {}
for i, id in ipairs(ids) do
    local doc = redis.call('HMGET', ARGV[1] .. id, 'name', 'age', 'features')
    docs[i] = {id, doc[1], doc[2], doc[3]}
end
return docs
"#;

/// KEYS: name index. ARGV: doc prefix, age. Returns {matched, modified}.
const SET_AGE_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, 0)
if #ids == 0 then
    return {0, 0}
end
local key = ARGV[1] .. ids[1]
if redis.call('HGET', key, 'age') == ARGV[2] then
    return {1, 0}
end
redis.call('HSET', key, 'age', ARGV[2])
return {1, 1}
"#;

/// KEYS: name index. ARGV: doc prefix, feature. Returns {matched, modified}.
const ADD_FEATURE_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, 0)
if #ids == 0 then
    return {0, 0}
end
local key = ARGV[1] .. ids[1]
local features = cjson.decode(redis.call('HGET', key, 'features'))
for _, feature in ipairs(features) do
    if feature == ARGV[2] then
        return {1, 0}
    end
end
table.insert(features, ARGV[2])
redis.call('HSET', key, 'features', cjson.encode(features))
return {1, 1}
"#;

/// KEYS: order, name index. ARGV: doc prefix. Returns 1 if removed.
const DELETE_ONE_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[2], 0, 0)
if #ids == 0 then
    return 0
end
redis.call('ZREM', KEYS[2], ids[1])
redis.call('ZREM', KEYS[1], ids[1])
redis.call('DEL', ARGV[1] .. ids[1])
return 1
"#;

/// KEYS: order. ARGV: doc prefix, name index prefix. Returns count removed.
const DELETE_ALL_LUA: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, -1)
for _, id in ipairs(ids) do
    local key = ARGV[1] .. id
    local name = redis.call('HGET', key, 'name')
    if name then
        redis.call('ZREM', ARGV[2] .. name, id)
    end
    redis.call('DEL', key)
end
redis.call('DEL', KEYS[1])
return #ids
"#;

/// `(id, name, age, features JSON)` as returned by the read scripts
type DocRow = (String, String, i64, String);

struct Scripts {
    insert: Script,
    find_one: Script,
    page: Script,
    set_age: Script,
    add_feature: Script,
    delete_one: Script,
    delete_all: Script,
}

impl Scripts {
    fn new() -> Self {
        Self {
            insert: Script::new(INSERT_LUA),
            find_one: Script::new(FIND_ONE_LUA),
            page: Script::new(PAGE_LUA),
            set_age: Script::new(SET_AGE_LUA),
            add_feature: Script::new(ADD_FEATURE_LUA),
            delete_one: Script::new(DELETE_ONE_LUA),
            delete_all: Script::new(DELETE_ALL_LUA),
        }
    }
}

/// Key names for one collection namespace
#[derive(Debug, Clone)]
struct Keys {
    namespace: String,
}

impl Keys {
    fn seq(&self) -> String {
        format!("{}:seq", self.namespace)
    }

    fn order(&self) -> String {
        format!("{}:order", self.namespace)
    }

    fn name_prefix(&self) -> String {
        format!("{}:name:", self.namespace)
    }

    fn name(&self, name: &str) -> String {
        format!("{}{}", self.name_prefix(), name)
    }

    fn doc_prefix(&self) -> String {
        format!("{}:doc:", self.namespace)
    }

    fn doc(&self, id: &str) -> String {
        format!("{}{}", self.doc_prefix(), id)
    }
}

/// Cat collection stored in Redis
pub struct RedisCatCollection {
    client: DocStoreClient,
    keys: Keys,
    scripts: Scripts,
}

impl RedisCatCollection {
    /// Binds a collection to the namespace of the client's configuration
    pub fn new(client: DocStoreClient) -> Self {
        let keys = Keys {
            namespace: client.config().namespace(),
        };

        Self {
            client,
            keys,
            scripts: Scripts::new(),
        }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DocStoreClient {
        &self.client
    }

    async fn fetch_page(&self, start: usize) -> StoreResult<Vec<CatDocument>> {
        let mut conn = self.client.get_connection();
        let stop = start + PAGE_SIZE - 1;

        let rows: Vec<DocRow> = self
            .scripts
            .page
            .key(self.keys.order())
            .arg(self.keys.doc_prefix())
            .arg(start)
            .arg(stop)
            .invoke_async(&mut conn)
            .await?;

        debug!(start, fetched = rows.len(), "Fetched page of documents");

        rows.into_iter().map(into_document).collect()
    }
}

#[async_trait]
impl CatCollection for RedisCatCollection {
    fn backend(&self) -> &str {
        "redis"
    }

    async fn insert(&self, cat: NewCat) -> StoreResult<CatId> {
        let cat = cat.normalized();
        let id = Uuid::new_v4().to_string();
        let features = serde_json::to_string(&cat.features)?;
        let mut conn = self.client.get_connection();

        let _position: i64 = self
            .scripts
            .insert
            .key(self.keys.seq())
            .key(self.keys.order())
            .key(self.keys.name(&cat.name))
            .key(self.keys.doc(&id))
            .arg(&id)
            .arg(&cat.name)
            .arg(cat.age)
            .arg(features)
            .invoke_async(&mut conn)
            .await?;

        Ok(id)
    }

    fn find_all(&self) -> BoxStream<'_, StoreResult<CatDocument>> {
        stream::try_unfold(Some(0usize), move |cursor| async move {
            let Some(start) = cursor else {
                return Ok::<_, StoreError>(None);
            };

            let page = self.fetch_page(start).await?;
            let next = if page.len() < PAGE_SIZE {
                None
            } else {
                Some(start + PAGE_SIZE)
            };

            let docs = stream::iter(page.into_iter().map(Ok::<CatDocument, StoreError>));
            Ok(Some((docs, next)))
        })
        .try_flatten()
        .boxed()
    }

    async fn find_one_by_name(&self, name: &str) -> StoreResult<Option<CatDocument>> {
        let mut conn = self.client.get_connection();

        let row: Option<DocRow> = self
            .scripts
            .find_one
            .key(self.keys.name(name))
            .arg(self.keys.doc_prefix())
            .invoke_async(&mut conn)
            .await?;

        row.map(into_document).transpose()
    }

    async fn set_age(&self, name: &str, age: i64) -> StoreResult<UpdateCounts> {
        let mut conn = self.client.get_connection();

        let (matched, modified): (u64, u64) = self
            .scripts
            .set_age
            .key(self.keys.name(name))
            .arg(self.keys.doc_prefix())
            .arg(age)
            .invoke_async(&mut conn)
            .await?;

        Ok(UpdateCounts { matched, modified })
    }

    async fn add_feature(&self, name: &str, feature: &str) -> StoreResult<UpdateCounts> {
        let mut conn = self.client.get_connection();

        let (matched, modified): (u64, u64) = self
            .scripts
            .add_feature
            .key(self.keys.name(name))
            .arg(self.keys.doc_prefix())
            .arg(feature)
            .invoke_async(&mut conn)
            .await?;

        Ok(UpdateCounts { matched, modified })
    }

    async fn delete_one_by_name(&self, name: &str) -> StoreResult<bool> {
        let mut conn = self.client.get_connection();

        let deleted: u64 = self
            .scripts
            .delete_one
            .key(self.keys.order())
            .key(self.keys.name(name))
            .arg(self.keys.doc_prefix())
            .invoke_async(&mut conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut conn = self.client.get_connection();

        let deleted: u64 = self
            .scripts
            .delete_all
            .key(self.keys.order())
            .arg(self.keys.doc_prefix())
            .arg(self.keys.name_prefix())
            .invoke_async(&mut conn)
            .await?;

        Ok(deleted)
    }
}

fn into_document((id, name, age, features): DocRow) -> StoreResult<CatDocument> {
    let features: Vec<String> = serde_json::from_str(&features)?;

    Ok(CatDocument {
        id,
        name,
        age,
        features,
    })
}
