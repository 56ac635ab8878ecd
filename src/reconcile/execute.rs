use super::plan::{Assignments, Step};
use crate::query::{exists, find, Criteria};
use crate::store::{Fields, ItemId, ListStore, StoreError};
use std::collections::VecDeque;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

/// One write performed against a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMutation {
    pub list: String,
    pub kind: MutationKind,
    pub id: ItemId,
    /// Fields written; empty for deletions
    pub fields: Fields,
}

/// Runs transition tables against a store, recording every write.
pub struct StepRunner<'a, S: ListStore + ?Sized> {
    store: &'a S,
    mutations: Vec<AppliedMutation>,
}

impl<'a, S: ListStore + ?Sized> StepRunner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            mutations: Vec::new(),
        }
    }

    pub fn into_mutations(self) -> Vec<AppliedMutation> {
        self.mutations
    }

    /// Run `steps` against `list` in order.
    ///
    /// Guards and targets are queried right before the step acts, so each
    /// step sees the writes of the steps before it. The first failing call
    /// stops the run; earlier writes stay in place.
    pub async fn run(&mut self, list: &str, steps: Vec<Step>) -> Result<(), StoreError> {
        let mut pending: VecDeque<Step> = steps.into();

        while let Some(step) = pending.pop_front() {
            match step {
                Step::Branch {
                    guard,
                    then,
                    otherwise,
                } => {
                    let found = exists(self.store, list, &guard).await?;
                    debug!(list = %list, guard = %guard, found, "Evaluated branch");
                    let chosen = if found { then } else { otherwise };
                    for next in chosen.into_iter().rev() {
                        pending.push_front(next);
                    }
                }
                Step::Upsert { key, on_create, set } => {
                    self.upsert(list, key, on_create, set).await?;
                }
                Step::Update { target, set } => {
                    self.update_matching(list, &target, set).await?;
                }
                Step::Create { fields } => {
                    self.create(list, fields).await?;
                }
                Step::Delete { target } => {
                    self.delete_matching(list, &target).await?;
                }
            }
        }

        Ok(())
    }

    async fn upsert(
        &mut self,
        list: &str,
        key: (&'static str, String),
        on_create: Assignments,
        set: Assignments,
    ) -> Result<(), StoreError> {
        let (key_field, key_value) = key;
        let criteria = Criteria::new().equals(key_field, key_value.as_str());

        if exists(self.store, list, &criteria).await? {
            info!("{}: Updating existing entry for {}", list, key_value);
        } else {
            info!("{}: Adding new entry for {}", list, key_value);
            let mut fields = vec![(key_field, key_value.clone())];
            fields.extend(on_create);
            self.create(list, fields).await?;
        }

        self.update_matching(list, &criteria, set).await
    }

    async fn create(&mut self, list: &str, fields: Assignments) -> Result<(), StoreError> {
        let subject = fields.first().map(|(_, v)| v.clone()).unwrap_or_default();
        info!("{}: Adding record for {}", list, subject);
        for (name, value) in fields.iter().skip(1) {
            log_assignment(list, name, value, &subject);
        }

        let fields = to_fields(fields);
        let id = self.store.create(list, fields.clone()).await?;
        self.record(list, MutationKind::Created, id, fields);
        Ok(())
    }

    async fn update_matching(
        &mut self,
        list: &str,
        target: &Criteria,
        set: Assignments,
    ) -> Result<(), StoreError> {
        if set.is_empty() {
            return Ok(());
        }

        let items = find(self.store, list, target).await?;
        if items.is_empty() {
            debug!(list = %list, target = %target, "No entry to update");
            return Ok(());
        }

        for (name, value) in &set {
            log_assignment(list, name, value, target.subject());
        }

        let fields = to_fields(set);
        for item in items {
            self.store.update(list, item.id, fields.clone()).await?;
            self.record(list, MutationKind::Updated, item.id, fields.clone());
        }
        Ok(())
    }

    async fn delete_matching(&mut self, list: &str, target: &Criteria) -> Result<(), StoreError> {
        for item in find(self.store, list, target).await? {
            info!(
                "{}: Deleting existing unreleased entry {} for {}",
                list,
                item.id,
                target.subject()
            );
            self.store.delete(list, item.id).await?;
            self.record(list, MutationKind::Deleted, item.id, Fields::new());
        }
        Ok(())
    }

    fn record(&mut self, list: &str, kind: MutationKind, id: ItemId, fields: Fields) {
        self.mutations.push(AppliedMutation {
            list: list.to_string(),
            kind,
            id,
            fields,
        });
    }
}

fn log_assignment(list: &str, name: &str, value: &str, subject: &str) {
    if value.is_empty() {
        info!("{}: Clearing '{}' for {}", list, name, subject);
    } else {
        info!("{}: Setting '{}'='{}' for {}", list, name, value, subject);
    }
}

fn to_fields(assignments: Assignments) -> Fields {
    assignments
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
