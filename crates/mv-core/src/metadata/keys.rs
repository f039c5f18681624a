//! Well-known request metadata keys

use super::MetadataKey;
use crate::navigation::NavigationType;
use crate::view::View;
use crate::view_model::ViewModelRef;

/// The view-model a show/close/restore request targets
pub const VIEW_MODEL: MetadataKey<ViewModelRef> = MetadataKey::new("request.view_model");

/// An already materialized view, used when restoring
pub const VIEW: MetadataKey<View> = MetadataKey::new("request.view");

/// Overrides the navigation type a presenter would pick on its own
pub const NAVIGATION_TYPE: MetadataKey<NavigationType> = MetadataKey::new("request.navigation_type");
