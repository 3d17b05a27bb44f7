//! Bucket state owned by the planning page.

use shared::domain::{Bucket, Module, ModuleId};

/// Four disjoint module lists. Lookups and removals are keyed by module id;
/// list order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    proposals: Vec<Module>,
    completions: Vec<Module>,
    bookings: Vec<Module>,
    plannings: Vec<Module>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[Module] {
        match bucket {
            Bucket::Proposals => &self.proposals,
            Bucket::Completions => &self.completions,
            Bucket::Bookings => &self.bookings,
            Bucket::Plannings => &self.plannings,
        }
    }

    fn list_mut(&mut self, bucket: Bucket) -> &mut Vec<Module> {
        match bucket {
            Bucket::Proposals => &mut self.proposals,
            Bucket::Completions => &mut self.completions,
            Bucket::Bookings => &mut self.bookings,
            Bucket::Plannings => &mut self.plannings,
        }
    }

    pub fn find(&self, bucket: Bucket, module_id: ModuleId) -> Option<&Module> {
        self.get(bucket).iter().find(|module| module.id == module_id)
    }

    pub fn find_mut(&mut self, bucket: Bucket, module_id: ModuleId) -> Option<&mut Module> {
        self.list_mut(bucket)
            .iter_mut()
            .find(|module| module.id == module_id)
    }

    /// Removes the module with `module_id` from `bucket`, if present.
    pub fn take(&mut self, bucket: Bucket, module_id: ModuleId) -> Option<Module> {
        let list = self.list_mut(bucket);
        let index = list.iter().position(|module| module.id == module_id)?;
        Some(list.remove(index))
    }

    /// Appends `module` to `bucket` unless its id is already held by any
    /// bucket. Returns whether the module was inserted.
    pub fn insert(&mut self, bucket: Bucket, module: Module) -> bool {
        if self.locate(module.id).is_some() {
            return false;
        }
        self.list_mut(bucket).push(module);
        true
    }

    /// Moves a module between buckets, keeping its id unique.
    pub fn transfer(&mut self, from: Bucket, to: Bucket, module_id: ModuleId) -> Option<&mut Module> {
        if from != to {
            let module = self.take(from, module_id)?;
            self.list_mut(to).push(module);
        }
        self.find_mut(to, module_id)
    }

    pub fn locate(&self, module_id: ModuleId) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| self.find(*bucket, module_id).is_some())
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|bucket| self.get(*bucket).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
