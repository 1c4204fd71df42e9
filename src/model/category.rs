use super::host::{BootStatus, HostRecord};
use std::collections::HashMap;
use tr::tr;

/// Which hosts a category lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    All,
    Status(BootStatus),
}

impl CategoryFilter {
    pub fn key(&self) -> &'static str {
        match self {
            CategoryFilter::All => "ALL",
            CategoryFilter::Status(status) => status.as_str(),
        }
    }

    /// Parses a raw category key. Unlike [`BootStatus`] parsing, `DONE` is not a
    /// category.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ALL" => Some(CategoryFilter::All),
            "RUNNING" => Some(CategoryFilter::Status(BootStatus::Running)),
            "REGISTERING" => Some(CategoryFilter::Status(BootStatus::Registering)),
            "REGISTERED" => Some(CategoryFilter::Status(BootStatus::Registered)),
            "FAILED" => Some(CategoryFilter::Status(BootStatus::Failed)),
            _ => None,
        }
    }

    pub fn matches(&self, host: &HostRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Status(status) => host.boot_status == *status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub filter: CategoryFilter,
    pub hosts_count: usize,
    pub is_active: bool,
    pub last: bool,
}

impl Category {
    fn new(filter: CategoryFilter) -> Self {
        Self {
            filter,
            hosts_count: 0,
            is_active: false,
            last: false,
        }
    }

    pub fn value(&self) -> String {
        match self.filter {
            CategoryFilter::All => tr!("All"),
            CategoryFilter::Status(BootStatus::Running) => tr!("Installing"),
            CategoryFilter::Status(BootStatus::Registering) => tr!("Registering"),
            CategoryFilter::Status(BootStatus::Registered) => tr!("Success"),
            CategoryFilter::Status(BootStatus::Failed) => tr!("Fail"),
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.value(), self.hosts_count)
    }

    pub fn item_class(&self) -> &'static str {
        if self.is_active { "active" } else { "" }
    }
}

/// The five boot status buckets shown above the host table.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRegistry {
    pub fn new() -> Self {
        let mut categories: Vec<Category> = std::iter::once(CategoryFilter::All)
            .chain(BootStatus::ALL.into_iter().map(CategoryFilter::Status))
            .map(Category::new)
            .collect();
        categories[0].is_active = true;
        if let Some(last) = categories.last_mut() {
            last.last = true;
        }
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, filter: CategoryFilter) -> Option<&Category> {
        self.categories.iter().find(|c| c.filter == filter)
    }

    /// The active category, if any.
    pub fn selected(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_active)
    }

    pub fn select_category(&mut self, filter: CategoryFilter) {
        for category in &mut self.categories {
            category.is_active = category.filter == filter;
        }
    }

    /// Selects by raw key. An unknown key leaves no category active.
    pub fn select_category_key(&mut self, key: &str) {
        match CategoryFilter::from_key(key) {
            Some(filter) => self.select_category(filter),
            None => {
                tracing::warn!(key, "unknown host category, no category is active");
                for category in &mut self.categories {
                    category.is_active = false;
                }
            }
        }
    }

    pub fn count_category_hosts<'a>(&mut self, hosts: impl IntoIterator<Item = &'a HostRecord>) {
        let mut counters: HashMap<BootStatus, usize> = HashMap::new();
        let mut total = 0;
        for host in hosts {
            total += 1;
            *counters.entry(host.boot_status).or_default() += 1;
        }
        for category in &mut self.categories {
            category.hosts_count = match category.filter {
                CategoryFilter::All => total,
                CategoryFilter::Status(status) => counters.get(&status).copied().unwrap_or(0),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(statuses: &[BootStatus]) -> Vec<HostRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| HostRecord::new(format!("host{i}"), *s))
            .collect()
    }

    fn active_count(registry: &CategoryRegistry) -> usize {
        registry.categories().iter().filter(|c| c.is_active).count()
    }

    #[test]
    fn test_registry_starts_with_all_active() {
        let registry = CategoryRegistry::new();
        let keys: Vec<_> = registry.categories().iter().map(|c| c.filter.key()).collect();
        assert_eq!(keys, ["ALL", "RUNNING", "REGISTERING", "REGISTERED", "FAILED"]);
        assert_eq!(registry.selected().map(|c| c.filter), Some(CategoryFilter::All));
        assert!(registry.categories()[4].last);
        assert!(!registry.categories()[0].last);
    }

    #[test]
    fn test_select_category_keeps_exactly_one_active() {
        let mut registry = CategoryRegistry::new();
        for filter in [
            CategoryFilter::Status(BootStatus::Failed),
            CategoryFilter::Status(BootStatus::Running),
            CategoryFilter::All,
            CategoryFilter::Status(BootStatus::Registered),
        ] {
            registry.select_category(filter);
            assert_eq!(active_count(&registry), 1);
            assert_eq!(registry.selected().map(|c| c.filter), Some(filter));
        }
    }

    #[test]
    fn test_unknown_key_deactivates_everything() {
        let mut registry = CategoryRegistry::new();
        registry.select_category_key("FAILED");
        assert_eq!(active_count(&registry), 1);

        registry.select_category_key("BOGUS");
        assert_eq!(active_count(&registry), 0);
        assert!(registry.selected().is_none());
    }

    #[test]
    fn test_counts_partition_hosts() {
        let mut registry = CategoryRegistry::new();
        let hosts = hosts(&[
            BootStatus::Running,
            BootStatus::Failed,
            BootStatus::Registered,
            BootStatus::Registered,
            BootStatus::Registering,
            BootStatus::Failed,
            BootStatus::Failed,
        ]);
        registry.count_category_hosts(&hosts);

        let count = |f| registry.get(f).map(|c| c.hosts_count).unwrap();
        assert_eq!(count(CategoryFilter::All), 7);
        assert_eq!(count(CategoryFilter::Status(BootStatus::Running)), 1);
        assert_eq!(count(CategoryFilter::Status(BootStatus::Registering)), 1);
        assert_eq!(count(CategoryFilter::Status(BootStatus::Registered)), 2);
        assert_eq!(count(CategoryFilter::Status(BootStatus::Failed)), 3);

        let per_status: usize = registry
            .categories()
            .iter()
            .filter(|c| c.filter != CategoryFilter::All)
            .map(|c| c.hosts_count)
            .sum();
        assert_eq!(per_status, hosts.len());
    }

    #[test]
    fn test_counts_reset_for_empty_list() {
        let mut registry = CategoryRegistry::new();
        registry.count_category_hosts(&hosts(&[BootStatus::Failed]));
        registry.count_category_hosts(&Vec::<HostRecord>::new());
        assert!(registry.categories().iter().all(|c| c.hosts_count == 0));
    }

    #[test]
    fn test_label_and_item_class() {
        let mut registry = CategoryRegistry::new();
        registry.count_category_hosts(&hosts(&[BootStatus::Failed, BootStatus::Failed]));
        let failed = registry.get(CategoryFilter::Status(BootStatus::Failed)).unwrap();
        assert_eq!(failed.label(), "Fail (2)");
        assert_eq!(failed.item_class(), "");
        assert_eq!(registry.selected().unwrap().item_class(), "active");
    }
}
