pub mod add_service;
pub mod host_list;
pub mod host_row;
pub mod lazy_loading;
pub mod run_loop;

pub use add_service::{AddServiceView, ClusterContext};
pub use host_list::HostListView;
pub use host_row::HostRowView;
pub use lazy_loading::{LazyLoader, LazyLoadingOptions};
