//! In-memory stand-in for the Qdrant REST endpoints used by [`QdrantFacade`].
//!
//! Supports collection create/get/delete, point upsert/delete and exact
//! cosine search. Mirrors the store-side rules the pipeline relies on:
//! re-creating a collection fails with 409, and a vector of the wrong size
//! fails with 400.
//!
//! [`QdrantFacade`]: crate::QdrantFacade

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use services::{BoxFuture, HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Debug, Default)]
struct Collection {
    size: usize,
    points: BTreeMap<u64, (Vec<f32>, Value)>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
    log: Vec<String>,
}

/// Shared, cloneable in-memory store. Clones see the same data.
#[derive(Clone, Debug, Default)]
pub struct InMemoryQdrant {
    state: Arc<Mutex<State>>,
}

impl InMemoryQdrant {
    /// Requests seen so far, rendered as `"METHOD path"`.
    pub fn routes(&self) -> Vec<String> {
        self.state.lock().map(|s| s.log.clone()).unwrap_or_default()
    }

    /// Number of points stored in `collection`, if it exists.
    pub fn point_count(&self, collection: &str) -> Option<usize> {
        let state = self.state.lock().ok()?;
        state.collections.get(collection).map(|c| c.points.len())
    }

    fn handle(&self, req: &HttpRequest) -> HttpResponse {
        let Ok(mut state) = self.state.lock() else {
            return HttpResponse::new(500, "poisoned");
        };
        state.log.push(format!("{} {}", req.method, req.path));

        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
        let body: Value = req
            .body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
            .unwrap_or(Value::Null);

        match (req.method.as_str(), segments.as_slice()) {
            ("PUT", ["collections", name]) => {
                if state.collections.contains_key(*name) {
                    return error(409, &format!("Collection `{name}` already exists!"));
                }
                let Some(size) = body["vectors"]["size"].as_u64() else {
                    return error(400, "missing vectors.size");
                };
                state.collections.insert(
                    name.to_string(),
                    Collection {
                        size: size as usize,
                        points: BTreeMap::new(),
                    },
                );
                ok(json!(true))
            }
            ("GET", ["collections", name]) => match state.collections.get(*name) {
                Some(c) => ok(json!({"status": "green", "points_count": c.points.len()})),
                None => error(404, &format!("Collection `{name}` doesn't exist!")),
            },
            ("DELETE", ["collections", name]) => {
                let existed = state.collections.remove(*name).is_some();
                ok(json!(existed))
            }
            ("PUT", ["collections", name, "points"]) => {
                let Some(coll) = state.collections.get_mut(*name) else {
                    return error(404, "collection not found");
                };
                let Some(points) = body["points"].as_array() else {
                    return error(400, "missing points");
                };
                let mut parsed = Vec::with_capacity(points.len());
                for p in points {
                    let (Some(id), Some(vector)) = (p["id"].as_u64(), p["vector"].as_array()) else {
                        return error(400, "malformed point");
                    };
                    let vector: Vec<f32> = vector
                        .iter()
                        .filter_map(|x| x.as_f64().map(|f| f as f32))
                        .collect();
                    if vector.len() != coll.size {
                        return error(
                            400,
                            &format!(
                                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                                coll.size,
                                vector.len()
                            ),
                        );
                    }
                    parsed.push((id, vector, p["payload"].clone()));
                }
                for (id, vector, payload) in parsed {
                    coll.points.insert(id, (vector, payload));
                }
                ok(json!({"operation_id": 0, "status": "acknowledged"}))
            }
            ("POST", ["collections", name, "points", "delete"]) => {
                let Some(coll) = state.collections.get_mut(*name) else {
                    return error(404, "collection not found");
                };
                for id in body["points"].as_array().into_iter().flatten() {
                    if let Some(id) = id.as_u64() {
                        coll.points.remove(&id);
                    }
                }
                ok(json!({"operation_id": 1, "status": "acknowledged"}))
            }
            ("POST", ["collections", name, "points", "search"]) => {
                let Some(coll) = state.collections.get(*name) else {
                    return error(404, "collection not found");
                };
                let query: Vec<f32> = body["vector"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(|x| x.as_f64().map(|f| f as f32))
                    .collect();
                if query.len() != coll.size {
                    return error(400, "Wrong input: query vector dimension mismatch");
                }
                let limit = body["limit"].as_u64().unwrap_or(10) as usize;

                let mut scored: Vec<(u64, f32, &Value)> = coll
                    .points
                    .iter()
                    .map(|(id, (v, payload))| (*id, cosine(&query, v), payload))
                    .collect();
                // Stable sort keeps id order for ties.
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));
                scored.truncate(limit);

                let result: Vec<Value> = scored
                    .into_iter()
                    .map(|(id, score, payload)| {
                        json!({"id": id, "version": 0, "score": score, "payload": payload})
                    })
                    .collect();
                ok(Value::Array(result))
            }
            _ => error(404, "unknown route"),
        }
    }
}

impl Transport for InMemoryQdrant {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        let resp = self
            .handle(&request)
            .for_request(&request.method, request.path.clone());
        Box::pin(async move { Ok(resp) })
    }
}

/// Cosine similarity; `0.0` when either vector has zero norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

fn ok(result: Value) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({"result": result, "status": "ok", "time": 0.0}).to_string(),
    )
}

fn error(status: u16, msg: &str) -> HttpResponse {
    HttpResponse::new(status, json!({"status": {"error": msg}, "time": 0.0}).to_string())
}
