use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Filter, Model, ModelError, Page, Pagination, Record};

const ID_FIELD: &str = "id";

/// In-memory model used by the demo server and the test suite.
///
/// Records are JSON objects keyed by a generated uuid `id`. Ownership is read
/// from a single column (`user_id` unless configured otherwise).
pub struct MemoryModel {
    base_route: String,
    owner_field: String,
    records: RwLock<Vec<Map<String, Value>>>,
}

impl MemoryModel {
    pub fn new(base_route: impl Into<String>) -> Self {
        Self {
            base_route: base_route.into(),
            owner_field: "user_id".to_string(),
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn with_owner_field(mut self, field: impl Into<String>) -> Self {
        self.owner_field = field.into();
        self
    }

    /// Seed records; objects without an `id` get one assigned.
    pub fn with_records(self, records: Vec<Record>) -> Self {
        let seeded = records
            .into_iter()
            .filter_map(|r| match r {
                Value::Object(map) => Some(assign_id(map)),
                _ => None,
            })
            .collect();
        Self {
            records: RwLock::new(seeded),
            ..self
        }
    }

    fn owned_by(&self, record: &Map<String, Value>, owner_id: &str) -> bool {
        record
            .get(&self.owner_field)
            .map(|v| value_as_key(v) == owner_id)
            .unwrap_or(false)
    }

    fn not_found(&self, id: &str) -> ModelError {
        ModelError::NotFound(format!("record {} not found in {}", id, self.base_route))
    }
}

fn assign_id(mut map: Map<String, Value>) -> Map<String, Value> {
    if !map.contains_key(ID_FIELD) {
        map.insert(ID_FIELD.into(), Value::String(Uuid::new_v4().to_string()));
    }
    map
}

/// Compare JSON values the way query strings arrive: by their plain text.
fn value_as_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(record: &Map<String, Value>, filter: &Filter) -> bool {
    filter.iter().all(|(key, expected)| {
        record
            .get(key)
            .map(|actual| value_as_key(actual) == value_as_key(expected))
            .unwrap_or(false)
    })
}

fn has_id(record: &Map<String, Value>, id: &str) -> bool {
    record.get(ID_FIELD).map(|v| value_as_key(v) == id).unwrap_or(false)
}

fn payload_object(payload: Record) -> Result<Map<String, Value>, ModelError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ModelError::Invalid("payload must be a JSON object".to_string())),
    }
}

fn paginate(rows: Vec<Map<String, Value>>, offset: usize, limit: usize) -> Page {
    let row_count = rows.len();
    let results = rows
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(Value::Object)
        .collect();
    Page {
        results,
        pagination: Pagination { offset, limit, row_count },
    }
}

#[async_trait]
impl Model for MemoryModel {
    fn base_route(&self) -> &str {
        &self.base_route
    }

    async fn find_all(&self, filter: Filter) -> Result<Vec<Record>, ModelError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| matches(r, &filter))
            .cloned()
            .map(Value::Object)
            .collect())
    }

    async fn find_all_by_user_id(&self, owner_id: &str, filter: Filter) -> Result<Vec<Record>, ModelError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| self.owned_by(r, owner_id) && matches(r, &filter))
            .cloned()
            .map(Value::Object)
            .collect())
    }

    async fn find_all_with_pagination(&self, offset: usize, limit: usize) -> Result<Page, ModelError> {
        let records = self.records.read().await;
        Ok(paginate(records.clone(), offset, limit))
    }

    async fn find_all_by_user_id_with_pagination(
        &self,
        owner_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page, ModelError> {
        let records = self.records.read().await;
        let owned = records.iter().filter(|r| self.owned_by(r, owner_id)).cloned().collect();
        Ok(paginate(owned, offset, limit))
    }

    async fn find_one_by_id(&self, id: &str) -> Result<Record, ModelError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| has_id(r, id))
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| self.not_found(id))
    }

    async fn find_one_by_id_and_user_id(&self, id: &str, owner_id: &str) -> Result<Record, ModelError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| has_id(r, id) && self.owned_by(r, owner_id))
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| self.not_found(id))
    }

    async fn create_object(&self, payload: Record) -> Result<Record, ModelError> {
        let mut record = payload_object(payload)?;
        record.remove(ID_FIELD);
        let record = assign_id(record);
        self.records.write().await.push(record.clone());
        Ok(Value::Object(record))
    }

    async fn update_by_id(&self, id: &str, payload: Record) -> Result<Record, ModelError> {
        let changes = payload_object(payload)?;
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| has_id(r, id)).ok_or_else(|| self.not_found(id))?;
        for (k, v) in changes {
            if k != ID_FIELD {
                record.insert(k, v);
            }
        }
        Ok(Value::Object(record.clone()))
    }

    async fn update_by_id_and_user_id(&self, id: &str, owner_id: &str, payload: Record) -> Result<Record, ModelError> {
        let changes = payload_object(payload)?;
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| has_id(r, id) && self.owned_by(r, owner_id))
            .ok_or_else(|| self.not_found(id))?;
        for (k, v) in changes {
            // Ownership cannot be handed over through the owner-scoped path
            if k != ID_FIELD && k != self.owner_field {
                record.insert(k, v);
            }
        }
        Ok(Value::Object(record.clone()))
    }

    async fn destroy_by_id(&self, id: &str) -> Result<(), ModelError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !has_id(r, id));
        if records.len() == before {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    async fn destroy_by_id_and_user_id(&self, id: &str, owner_id: &str) -> Result<(), ModelError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(has_id(r, id) && self.owned_by(r, owner_id)));
        if records.len() == before {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, ModelError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn count_by_user_id(&self, owner_id: &str) -> Result<u64, ModelError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| self.owned_by(r, owner_id)).count() as u64)
    }
}
