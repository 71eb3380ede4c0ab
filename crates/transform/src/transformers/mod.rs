//! The migration catalogue: every concrete transformer, plus the production
//! registry wiring.
//!
//! All transformers compose the same [`crate::rewrite`] primitive with small
//! pure field-level functions; scoping (event names, cutovers, stream
//! allow-lists) comes exclusively from the injected manifest.

mod archival;
mod attendance;
mod bail;
mod document;
mod properties;
mod retired;

pub use archival::ArchivalSuffixRedirect;
pub use attendance::{AttendanceDayReshape, ATTENDANCE_DAY_PATH};
pub use bail::{BailStatusExpansion, BAIL_STATUS_PATH};
pub use document::DocumentTypeClassifier;
pub use properties::{AddProperty, RemoveProperty, RenameProperty};
pub use retired::RetiredEventDeactivation;

use std::sync::Arc;

use thiserror::Error;

use crate::lookup::ReferenceData;
use crate::manifest::{ManifestError, MigrationManifest};
use crate::path::PathPattern;
use crate::registry::{GroupDiscipline, RegistryError, TransformerRegistry};
use crate::scope::EventScope;

/// Manifest scope keys understood by [`migration_catalogue`].
pub const SCOPE_RETIRED_EVENTS: &str = "retired-events";
pub const SCOPE_ARCHIVAL_REDIRECT: &str = "archival-redirect";
pub const SCOPE_REMAND_STATUS_RENAME: &str = "remand-status-rename";
pub const SCOPE_BAIL_STATUS_EXPANSION: &str = "bail-status-expansion";
pub const SCOPE_DEFENDANT_NAME_RENAME: &str = "defendant-name-rename";
pub const SCOPE_CASE_REFERENCE_RENAME: &str = "case-reference-rename";
pub const SCOPE_ATTENDANCE_DAY_RESHAPE: &str = "attendance-day-reshape";
pub const SCOPE_DOCUMENT_TYPE_CLASSIFIER: &str = "document-type-classifier";
pub const SCOPE_DUPLICATE_LISTING_PATCH: &str = "duplicate-listing-patch";

/// Suffix an old release appended to archived event names.
const ARCHIVAL_SUFFIX: &str = "-archived";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Build the production registry from an explicit manifest.
///
/// Two groups:
/// - `lifecycle` (exclusive): retirements and archival redirects — one-shot
///   decisions where the first match settles the event's fate;
/// - `reshape` (layered): orthogonal payload fixes that must compose on the
///   same event name (the remand→bail rename feeds the enum expansion).
pub fn migration_catalogue(
    manifest: &MigrationManifest,
    reference: Arc<dyn ReferenceData>,
) -> Result<TransformerRegistry, CatalogueError> {
    let scope = |key: &str| -> Result<EventScope, ManifestError> {
        Ok(EventScope::from_entry(manifest.scope(key)?))
    };

    let registry = TransformerRegistry::builder()
        .group("lifecycle", GroupDiscipline::Exclusive)
        .group("reshape", GroupDiscipline::Layered)
        .register(
            "lifecycle",
            10,
            Arc::new(RetiredEventDeactivation::new(scope(SCOPE_RETIRED_EVENTS)?)),
        )
        .register(
            "lifecycle",
            20,
            Arc::new(ArchivalSuffixRedirect::new(
                scope(SCOPE_ARCHIVAL_REDIRECT)?,
                ARCHIVAL_SUFFIX,
            )),
        )
        .register(
            "reshape",
            10,
            Arc::new(RenameProperty::new(
                "remand-status-rename",
                scope(SCOPE_REMAND_STATUS_RENAME)?,
                PathPattern::parse("defendants.#"),
                "remandStatus",
                "bailStatus",
            )),
        )
        .register(
            "reshape",
            20,
            Arc::new(BailStatusExpansion::new(scope(SCOPE_BAIL_STATUS_EXPANSION)?)),
        )
        .register(
            "reshape",
            30,
            Arc::new(RenameProperty::new(
                "defendant-forename-rename",
                scope(SCOPE_DEFENDANT_NAME_RENAME)?,
                PathPattern::root(),
                "forename",
                "firstName",
            )),
        )
        .register(
            "reshape",
            31,
            Arc::new(RenameProperty::new(
                "defendant-surname-rename",
                scope(SCOPE_DEFENDANT_NAME_RENAME)?,
                PathPattern::root(),
                "surname",
                "lastName",
            )),
        )
        .register(
            "reshape",
            40,
            Arc::new(RenameProperty::new(
                "case-reference-to-urn",
                scope(SCOPE_CASE_REFERENCE_RENAME)?,
                PathPattern::root(),
                "caseReference",
                "caseUrn",
            )),
        )
        .register(
            "reshape",
            50,
            Arc::new(AttendanceDayReshape::new(scope(SCOPE_ATTENDANCE_DAY_RESHAPE)?)),
        )
        .register(
            "reshape",
            60,
            Arc::new(DocumentTypeClassifier::new(
                scope(SCOPE_DOCUMENT_TYPE_CLASSIFIER)?,
                reference,
            )),
        )
        .register(
            "reshape",
            70,
            Arc::new(RemoveProperty::new(
                "duplicate-listing-patch",
                scope(SCOPE_DUPLICATE_LISTING_PATCH)?,
                PathPattern::root(),
                "duplicateListing",
            )),
        )
        .build()?;

    Ok(registry)
}
