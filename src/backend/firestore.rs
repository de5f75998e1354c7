//! Cloud Firestore backend over the REST API.
//!
//! Tasks live in the `tasks` collection, one document per task, with the
//! record fields stored as Firestore typed values. The document name's last
//! segment is the task id; the id itself is never written as a field.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{BackendError, TaskBackend};
use crate::constants::{FIRESTORE_BASE_URL, TASKS_COLLECTION};
use crate::identity::UserId;
use crate::model::{NewTask, Task};

/// Firestore REST backend.
pub struct FirestoreBackend {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

impl FirestoreBackend {
    /// Create a backend for `project_id` on the public Firestore endpoint.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id: project_id.into(),
            api_key: None,
            id_token: None,
        }
    }

    /// Point the backend at another endpoint, e.g. the local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Web API key sent as the `key` query parameter.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Identity token sent as a bearer token so security rules see the user.
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    fn documents_url(&self) -> String {
        format!("{}/projects/{}/databases/(default)/documents", self.base_url, self.project_id)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url(), TASKS_COLLECTION)
    }

    fn document_url(&self, task_id: &str) -> String {
        format!("{}/{}", self.collection_url(), task_id)
    }

    fn request(&self, method: Method, url: &str, params: &[(&str, &str)]) -> Result<RequestBuilder, BackendError> {
        let mut url = Url::parse(url).map_err(|e| BackendError::Other(format!("invalid Firestore URL {url}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(api_key) = &self.api_key {
                query.append_pair("key", api_key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.id_token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }
}

#[async_trait]
impl TaskBackend for FirestoreBackend {
    fn backend_type(&self) -> &str {
        "firestore"
    }

    async fn fetch_tasks(&self, owner: &UserId) -> Result<Vec<Task>, BackendError> {
        let url = format!("{}:runQuery", self.documents_url());
        let resp = self
            .request(Method::POST, &url, &[])?
            .json(&owner_query(owner))
            .send()
            .await?;
        let items: Vec<RunQueryItem> = check_response(resp).await?.json().await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|doc| decode_document(&doc))
            .collect()
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, BackendError> {
        let resp = self
            .request(Method::POST, &self.collection_url(), &[])?
            .json(&json!({ "fields": encode_fields(task)? }))
            .send()
            .await?;
        let doc: Document = check_response(resp).await?.json().await?;
        Ok(document_id(&doc.name).to_string())
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        let resp = self
            .request(
                Method::PATCH,
                &self.document_url(&task.id),
                &[("currentDocument.exists", "true")],
            )?
            .json(&json!({ "fields": encode_fields(&task.to_fields())? }))
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), BackendError> {
        let resp = self
            .request(Method::DELETE, &self.document_url(task_id), &[])?
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}

/// Map non-success statuses onto [`BackendError`].
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => BackendError::Auth(format!("Firestore returned {status}: {body}")),
        404 => BackendError::NotFound(body),
        _ => BackendError::Other(format!("Firestore returned {status}: {body}")),
    })
}

fn owner_query(owner: &UserId) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": TASKS_COLLECTION }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": owner.as_str() }
                }
            }
        }
    })
}

fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn encode_fields(task: &NewTask) -> Result<Map<String, Value>, BackendError> {
    match serde_json::to_value(task) {
        Ok(Value::Object(plain)) => Ok(plain.iter().map(|(k, v)| (k.clone(), to_typed_value(v))).collect()),
        Ok(other) => Err(BackendError::InvalidData(format!("task did not serialize to an object: {other}"))),
        Err(e) => Err(BackendError::InvalidData(e.to_string())),
    }
}

fn decode_document(doc: &Document) -> Result<Task, BackendError> {
    let mut plain: Map<String, Value> = doc
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), from_typed_value(v)))
        .filter(|(_, v)| !v.is_null())
        .collect();
    plain.insert("id".to_string(), Value::String(document_id(&doc.name).to_string()));

    serde_json::from_value(Value::Object(plain))
        .map_err(|e| BackendError::InvalidData(format!("document {}: {e}", doc.name)))
}

fn to_typed_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({ "arrayValue": { "values": items.iter().map(to_typed_value).collect::<Vec<_>>() } }),
        Value::Object(map) => {
            let fields: Map<String, Value> = map.iter().map(|(k, v)| (k.clone(), to_typed_value(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn from_typed_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_typed_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| fields.iter().map(|(k, v)| (k.clone(), from_typed_value(v))).collect())
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Repeat};

    const RUN_QUERY_FIXTURE: &str = r#"[
        {
            "document": {
                "name": "projects/demo/databases/(default)/documents/tasks/abc123",
                "fields": {
                    "title": { "stringValue": "Water the garden" },
                    "completed": { "booleanValue": false },
                    "important": { "booleanValue": true },
                    "userId": { "stringValue": "user-1" },
                    "listId": { "stringValue": "today" },
                    "dueDate": { "stringValue": "2025-06-01" },
                    "repeat": { "stringValue": "weekly" },
                    "priority": { "stringValue": "high" },
                    "createdAt": { "stringValue": "2025-05-30T08:00:00.000Z" },
                    "isOutdoor": { "booleanValue": true },
                    "location": { "stringValue": "Lisbon" },
                    "description": { "nullValue": null }
                },
                "createTime": "2025-05-30T08:00:00.100000Z",
                "updateTime": "2025-05-30T08:00:00.100000Z"
            },
            "readTime": "2025-05-30T09:00:00.000000Z"
        },
        {
            "document": {
                "name": "projects/demo/databases/(default)/documents/tasks/def456",
                "fields": {
                    "title": { "stringValue": "Old record" },
                    "userId": { "stringValue": "user-1" }
                }
            }
        }
    ]"#;

    #[test]
    fn decodes_run_query_documents() {
        let items: Vec<RunQueryItem> = serde_json::from_str(RUN_QUERY_FIXTURE).unwrap();
        let tasks: Vec<Task> = items
            .into_iter()
            .filter_map(|i| i.document)
            .map(|d| decode_document(&d).unwrap())
            .collect();

        assert_eq!(tasks.len(), 2);
        let first = &tasks[0];
        assert_eq!(first.id, "abc123");
        assert_eq!(first.title, "Water the garden");
        assert!(first.important);
        assert_eq!(first.repeat, Some(Repeat::Weekly));
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.description, None);
        assert_eq!(first.location, "Lisbon");

        // Sparse documents fall back to model defaults
        let second = &tasks[1];
        assert_eq!(second.priority, Priority::Medium);
        assert!(!second.completed);
        assert_eq!(second.list_id(), "today");
    }

    #[test]
    fn empty_query_result_has_no_documents() {
        let items: Vec<RunQueryItem> = serde_json::from_str(r#"[{ "readTime": "2025-05-30T09:00:00Z" }]"#).unwrap();
        assert!(items.into_iter().all(|i| i.document.is_none()));
    }

    #[test]
    fn encodes_fields_without_id() {
        let task = NewTask {
            title: "Run".to_string(),
            description: None,
            completed: true,
            important: false,
            user_id: "user-1".to_string(),
            list_id: Some("sport".to_string()),
            due_date: None,
            due_time: None,
            reminder: None,
            repeat: None,
            priority: Priority::Low,
            created_at: "2025-05-30T08:00:00.000Z".to_string(),
            is_outdoor: false,
            location: String::new(),
        };
        let fields = encode_fields(&task).unwrap();

        assert!(!fields.contains_key("id"));
        assert!(!fields.contains_key("description"));
        assert_eq!(fields["title"], json!({ "stringValue": "Run" }));
        assert_eq!(fields["completed"], json!({ "booleanValue": true }));
        assert_eq!(fields["priority"], json!({ "stringValue": "low" }));
        assert_eq!(fields["userId"], json!({ "stringValue": "user-1" }));
    }

    #[test]
    fn typed_values_cover_nested_shapes() {
        let typed = to_typed_value(&json!({ "n": 3, "tags": ["a"], "x": 1.5 }));
        assert_eq!(typed["mapValue"]["fields"]["n"], json!({ "integerValue": "3" }));
        assert_eq!(from_typed_value(&typed), json!({ "n": 3, "tags": ["a"], "x": 1.5 }));
    }

    #[test]
    fn document_id_is_last_path_segment() {
        assert_eq!(document_id("projects/p/databases/(default)/documents/tasks/xyz"), "xyz");
        assert_eq!(document_id("xyz"), "xyz");
    }

    #[test]
    fn owner_query_filters_on_user_id() {
        let owner = UserId::new("user-9").unwrap();
        let query = owner_query(&owner);
        let filter = &query["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "userId");
        assert_eq!(filter["value"]["stringValue"], "user-9");
    }

    #[test]
    fn request_urls_carry_api_key_and_preconditions() {
        let backend = FirestoreBackend::new("demo")
            .with_base_url("http://localhost:8080/v1/")
            .with_api_key("k");
        let request = backend
            .request(Method::PATCH, &backend.document_url("t1"), &[("currentDocument.exists", "true")])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/tasks/t1?currentDocument.exists=true&key=k"
        );
    }
}
