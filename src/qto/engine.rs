use super::aggregate::{aggregate_by_index, aggregate_by_scan, Strategy};
use super::index::{build_index, ReverseIndex};
use super::kinds::QuantityKinds;
use super::result::{AggregationResult, EPSILON};
use crate::model::{Model, Selection};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Identifies one started aggregation; see [`QtoEngine::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Holds the loaded models and their indices, reacts to selection events and
/// keeps the latest takeoff.
#[derive(Debug, Default)]
pub struct QtoEngine {
    models: BTreeMap<String, Model>,
    indices: HashMap<String, ReverseIndex>,
    kinds: QuantityKinds,
    strategy: Strategy,
    result: AggregationResult,
    generation: u64,
    last_elapsed_ms: Option<f64>,
}

impl QtoEngine {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Registers a model and, when it has a property table, indexes it.
    /// A model with the same key is replaced.
    pub fn add_model(&mut self, model: Model) {
        let key = model.key.clone();
        self.indices.remove(&key);

        if let Some(properties) = &model.properties {
            let started = Instant::now();
            let index = build_index(properties);
            tracing::debug!(
                model = %key,
                indexed_elements = index.len(),
                elapsed_ms = elapsed_ms(started),
                "Indexed model"
            );
            self.indices.insert(key.clone(), index);
        } else {
            tracing::debug!(model = %key, "Model has no property table yet");
        }

        self.models.insert(key, model);
        self.rebuild_kinds();
    }

    pub fn remove_model(&mut self, key: &str) -> Option<Model> {
        self.indices.remove(key);
        let removed = self.models.remove(key);
        self.rebuild_kinds();
        removed
    }

    /// First free key derived from `base`: `base`, `base-2`, `base-3`, ...
    #[must_use]
    pub fn unique_key(&self, base: &str) -> String {
        if !self.models.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|key| !self.models.contains_key(key))
            .unwrap_or_else(|| base.to_string())
    }

    #[must_use]
    pub fn quantity_kinds(&self) -> &QuantityKinds {
        &self.kinds
    }

    fn rebuild_kinds(&mut self) {
        let mut kinds = QuantityKinds::default();
        for properties in self.models.values().filter_map(|m| m.properties.as_ref()) {
            kinds.merge(QuantityKinds::from_table(properties));
        }
        self.kinds = kinds;
    }

    #[must_use]
    pub fn model(&self, key: &str) -> Option<&Model> {
        self.models.get(key)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    #[must_use]
    pub fn has_index(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Latest published takeoff.
    #[must_use]
    pub fn result(&self) -> &AggregationResult {
        &self.result
    }

    /// Wall time of the last aggregation, in milliseconds.
    #[must_use]
    pub fn last_elapsed_ms(&self) -> Option<f64> {
        self.last_elapsed_ms
    }

    /// Handles a highlight event: recomputes the takeoff from scratch.
    pub fn on_highlight(&mut self, selection: &Selection) -> &AggregationResult {
        if selection.is_empty() {
            self.on_clear();
            return &self.result;
        }
        let ticket = self.begin();
        let started = Instant::now();
        let result = self.aggregate(selection);
        self.last_elapsed_ms = Some(elapsed_ms(started));
        self.publish(ticket, result);
        &self.result
    }

    /// Handles a clear event.
    pub fn on_clear(&mut self) {
        self.begin();
        self.result = AggregationResult::new();
        self.last_elapsed_ms = None;
    }

    pub fn dispose(&mut self) {
        self.on_clear();
    }

    /// Runs the configured strategy without publishing.
    #[must_use]
    pub fn aggregate(&self, selection: &Selection) -> AggregationResult {
        match self.strategy {
            Strategy::Scan => self.scan(selection),
            Strategy::Index => self.indexed(selection),
            Strategy::Both => {
                let scanned = self.scan(selection);
                let indexed = self.indexed(selection);
                if !scanned.approx_eq(&indexed, EPSILON) {
                    tracing::warn!(
                        scan_entries = scanned.len(),
                        index_entries = indexed.len(),
                        "Scan and indexed takeoffs disagree"
                    );
                }
                indexed
            }
        }
    }

    /// Marks the start of a new aggregation, superseding older ones.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Publishes `result` unless a newer aggregation has started since
    /// `ticket` was issued. Returns whether it was published.
    pub fn publish(&mut self, ticket: Ticket, result: AggregationResult) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "Dropping stale takeoff"
            );
            return false;
        }
        self.result = result;
        true
    }

    fn scan(&self, selection: &Selection) -> AggregationResult {
        let started = Instant::now();
        let result = aggregate_by_scan(&self.models, selection);
        tracing::debug!(
            entries = result.len(),
            elapsed_ms = elapsed_ms(started),
            "Quantities by relation scan"
        );
        result
    }

    fn indexed(&self, selection: &Selection) -> AggregationResult {
        let started = Instant::now();
        let result = aggregate_by_index(&self.models, &self.indices, selection);
        tracing::debug!(
            entries = result.len(),
            elapsed_ms = elapsed_ms(started),
            "Quantities by reverse index"
        );
        result
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
