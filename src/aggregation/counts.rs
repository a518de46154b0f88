//! Summing per-foundation counts into totals.

use crate::models::{ApplicationCounts, ServiceInstanceCounts};
use std::collections::BTreeMap;

/// A tally that sums element-wise with another of the same kind.
///
/// `Default` must be the all-zero tally; it is both the identity of the sum
/// and the contribution of a foundation whose summary could not be fetched.
pub trait Counts: Default {
    fn absorb(&mut self, other: &Self);
}

/// Sum a sequence of tallies. An empty sequence yields all zeros.
///
/// The result does not depend on input order.
pub fn aggregate<C: Counts>(counts: impl IntoIterator<Item = C>) -> C {
    counts.into_iter().fold(C::default(), |mut total, c| {
        total.absorb(&c);
        total
    })
}

/// Add every category of `from` into `into`; missing categories count as zero.
fn add_categories(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) {
    for (category, count) in from {
        let slot = into.entry(category.clone()).or_insert(0);
        *slot = slot.saturating_add(*count);
    }
}

impl Counts for ApplicationCounts {
    fn absorb(&mut self, other: &Self) {
        add_categories(&mut self.by_buildpack, &other.by_buildpack);
        add_categories(&mut self.by_stack, &other.by_stack);
        add_categories(&mut self.by_status, &other.by_status);
        self.total_applications = self
            .total_applications
            .saturating_add(other.total_applications);
        self.total_running_application_instances = self
            .total_running_application_instances
            .saturating_add(other.total_running_application_instances);
        self.total_stopped_application_instances = self
            .total_stopped_application_instances
            .saturating_add(other.total_stopped_application_instances);
        self.total_crashed_application_instances = self
            .total_crashed_application_instances
            .saturating_add(other.total_crashed_application_instances);
        self.total_application_instances = self
            .total_application_instances
            .saturating_add(other.total_application_instances);
    }
}

impl Counts for ServiceInstanceCounts {
    fn absorb(&mut self, other: &Self) {
        add_categories(&mut self.by_service, &other.by_service);
        add_categories(&mut self.by_service_and_plan, &other.by_service_and_plan);
        self.total_service_instances = self
            .total_service_instances
            .saturating_add(other.total_service_instances);
    }
}
