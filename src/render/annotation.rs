// src/render/annotation.rs
use anyhow::{Context, Result};
use flume::{Receiver, Sender};
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub id: u64,
    pub lon: f64,
    pub lat: f64,
    pub note: String,
}

/// One user edit, as a map widget reports it. In JSON the variant is named by `"event"`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnnotationEvent {
    /// A point was drawn.
    Add { lon: f64, lat: f64, note: String },
    /// The note text of an existing point changed.
    SetNote { id: u64, note: String },
    Remove { id: u64 },
}

#[derive(Default)]
struct StoreState {
    annotations: Vec<Annotation>,
    next_id: u64,
}

/// In-memory point annotations, updated only through [`AnnotationEvent`]s.
///
/// Annotations are display-only: they never feed back into the classification.
#[derive(Default)]
pub struct AnnotationStore {
    state: Mutex<StoreState>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event channel a widget uses to report edits to this store.
    pub fn channel() -> (Sender<AnnotationEvent>, Receiver<AnnotationEvent>) {
        flume::unbounded()
    }

    /// Rebuild a store by replaying a JSON array of events recorded by a widget.
    pub fn from_event_log(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read annotation log {}", path.display()))?;
        let events: Vec<AnnotationEvent> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid annotation log {}", path.display()))?;

        let store = Self::new();
        let (tx, rx) = Self::channel();
        for event in events {
            tx.send(event)?;
        }
        drop(tx);

        let applied = store.listen(rx);
        debug!(
            "Replayed {} annotation events from {}, {} points kept",
            applied,
            path.display(),
            store.len()
        );
        Ok(store)
    }

    /// Apply one event, returning the id of the annotation it touched.
    ///
    /// Events naming an unknown id are ignored and return `None`.
    pub fn apply(&self, event: AnnotationEvent) -> Option<u64> {
        let mut state = self.state.lock();
        match event {
            AnnotationEvent::Add { lon, lat, note } => {
                let id = state.next_id;
                state.next_id += 1;
                state.annotations.push(Annotation { id, lon, lat, note });
                Some(id)
            }
            AnnotationEvent::SetNote { id, note } => {
                let annotation = state.annotations.iter_mut().find(|a| a.id == id)?;
                annotation.note = note;
                Some(id)
            }
            AnnotationEvent::Remove { id } => {
                let position = state.annotations.iter().position(|a| a.id == id)?;
                state.annotations.remove(position);
                Some(id)
            }
        }
    }

    /// Apply every event already queued on `events` without blocking.
    pub fn drain(&self, events: &Receiver<AnnotationEvent>) -> usize {
        events.try_iter().map(|event| self.apply(event)).count()
    }

    /// Apply events until every sender is dropped.
    pub fn listen(&self, events: Receiver<AnnotationEvent>) -> usize {
        events.iter().map(|event| self.apply(event)).count()
    }

    pub fn len(&self) -> usize {
        self.state.lock().annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Annotation> {
        self.state.lock().annotations.clone()
    }

    /// Current annotations as a GeoJSON `FeatureCollection` of points.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .snapshot()
            .into_iter()
            .map(|annotation| {
                json!({
                    "type": "Feature",
                    "id": annotation.id,
                    "geometry": {
                        "type": "Point",
                        "coordinates": [annotation.lon, annotation.lat],
                    },
                    "properties": { "note": annotation.note },
                })
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }
}
