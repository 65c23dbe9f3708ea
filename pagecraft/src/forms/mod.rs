//! Form handling for the console
//!
//! - [`FormWizard`]: the multi-step fill-and-generate flow
//! - [`PageForm`]: page editor input with indexed field rows
//! - [`LoginForm`], [`TemplateForm`], [`PermissionForm`]: posted bodies
//!   checked with `validator`
//! - [`ValidationErrors`]: per-field messages shared by all of the above

pub mod error;
pub mod inputs;
pub mod page_form;
pub mod wizard;

pub use error::{FieldError, ValidationErrors};
pub use inputs::{LoginForm, PermissionForm, TemplateForm};
pub use page_form::{FieldRow, PageForm};
pub use wizard::{FormWizard, WizardError, WizardStep};
