use crate::error::SelectionError;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Selected element ids, grouped by model key.
///
/// Models never map to an empty set; removing the last id drops the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    models: BTreeMap<String, BTreeSet<u64>>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from element ids delivered as text, as selection
    /// events carry them. Ids that are not non-negative integers are skipped.
    pub fn from_text_ids<M, I, S>(groups: impl IntoIterator<Item = (M, I)>) -> Self
    where
        M: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();
        for (model, ids) in groups {
            let model = model.into();
            for raw in ids {
                match parse_element_id(raw.as_ref()) {
                    Some(id) => selection.insert(&model, id),
                    None => {
                        tracing::warn!(model = %model, id = raw.as_ref(), "Ignoring non-numeric element id");
                    }
                }
            }
        }
        selection
    }

    pub fn insert(&mut self, model: &str, id: u64) {
        self.models.entry(model.to_string()).or_default().insert(id);
    }

    pub fn extend(&mut self, model: &str, ids: impl IntoIterator<Item = u64>) {
        let mut ids = ids.into_iter().peekable();
        if ids.peek().is_some() {
            self.models.entry(model.to_string()).or_default().extend(ids);
        }
    }

    /// Adds the id if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, model: &str, id: u64) -> bool {
        if let Some(ids) = self.models.get_mut(model) {
            if ids.remove(&id) {
                if ids.is_empty() {
                    self.models.remove(model);
                }
                return false;
            }
        }
        self.insert(model, id);
        true
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    #[must_use]
    pub fn contains(&self, model: &str, id: u64) -> bool {
        self.models.get(model).is_some_and(|ids| ids.contains(&id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Total number of selected elements across models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<u64>)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn parse_element_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.strip_prefix('#').unwrap_or(raw).parse().ok()
}

/// Element ids of one `--select` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIds {
    All,
    Ids(Vec<u64>),
}

/// One `MODEL:ID[,ID...]` (or `MODEL:*`) command-line selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionArg {
    pub model: String,
    pub ids: SelectionIds,
}

impl FromStr for SelectionArg {
    type Err = SelectionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (model, ids) = input
            .rsplit_once(':')
            .ok_or_else(|| SelectionError::MissingSeparator {
                input: input.to_string(),
            })?;

        let model = model.trim();
        if model.is_empty() {
            return Err(SelectionError::EmptyModel {
                input: input.to_string(),
            });
        }

        let ids = if ids.trim() == "*" {
            SelectionIds::All
        } else {
            let parsed = ids
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    parse_element_id(s).ok_or_else(|| SelectionError::InvalidId {
                        id: s.trim().to_string(),
                        input: input.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            SelectionIds::Ids(parsed)
        };

        Ok(Self {
            model: model.to_string(),
            ids,
        })
    }
}
