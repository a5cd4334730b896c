//! What the new-appointment form shows for each mode.
//!
//! The rendering layer draws whatever `FormLayout` lists: the fields in
//! order, the submit button label and its style. Physician options come from
//! the catalog; only the name is submitted.

use serde::Serialize;

use crate::backend::PhysicianCatalog;
use crate::models::{FormField, Mode, Physician};
use crate::validation::select_schema;

pub const HEADER: &str = "New Appointment";
pub const SUB_HEADER: &str = "Request a new appointment in 10 seconds.";

/// Date picker display format, including the time selector.
pub const SCHEDULE_DATE_FORMAT: &str = "MM/dd/yyyy  -  h:mm aa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Select,
    DatePicker {
        #[serde(rename = "showTimeSelect")]
        show_time_select: bool,
        #[serde(rename = "dateFormat")]
        date_format: &'static str,
    },
    Textarea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field: FormField,
    pub kind: FieldKind,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub required: bool,
    pub options: Vec<Physician>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitButton {
    pub label: &'static str,
    pub style: ButtonStyle,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    pub mode: Mode,
    pub header: &'static str,
    pub sub_header: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub submit: SubmitButton,
}

impl FormLayout {
    /// Layout for an idle form.
    pub fn for_mode(mode: Mode, catalog: &dyn PhysicianCatalog) -> Self {
        let fields = match mode {
            Mode::Create | Mode::Schedule => booking_fields(mode, catalog),
            Mode::Cancel => vec![FieldDescriptor {
                field: FormField::CancellationReason,
                kind: FieldKind::Textarea,
                label: "Reason for cancellation",
                placeholder: Some("Enter reason for cancellation"),
                required: select_schema(mode).is_required(FormField::CancellationReason),
                options: Vec::new(),
            }],
        };

        Self {
            mode,
            header: HEADER,
            sub_header: SUB_HEADER,
            fields,
            submit: SubmitButton {
                label: submit_label(mode),
                style: submit_style(mode),
                disabled: false,
            },
        }
    }

    /// Disable the submit button while a submission is in flight.
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.submit.disabled = loading;
        self
    }

    pub fn shows(&self, field: FormField) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

pub fn submit_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Create => "Create Appointment",
        Mode::Schedule => "Schedule Appointment",
        Mode::Cancel => "Cancel Appointment",
    }
}

pub fn submit_style(mode: Mode) -> ButtonStyle {
    match mode {
        Mode::Cancel => ButtonStyle::Danger,
        Mode::Create | Mode::Schedule => ButtonStyle::Primary,
    }
}

fn booking_fields(mode: Mode, catalog: &dyn PhysicianCatalog) -> Vec<FieldDescriptor> {
    let schema = select_schema(mode);
    vec![
        FieldDescriptor {
            field: FormField::PrimaryPhysician,
            kind: FieldKind::Select,
            label: "Doctor",
            placeholder: Some("Select a doctor"),
            required: schema.is_required(FormField::PrimaryPhysician),
            options: catalog.physicians(),
        },
        FieldDescriptor {
            field: FormField::Schedule,
            kind: FieldKind::DatePicker {
                show_time_select: true,
                date_format: SCHEDULE_DATE_FORMAT,
            },
            label: "Expected appointment date",
            placeholder: None,
            required: schema.is_required(FormField::Schedule),
            options: Vec::new(),
        },
        FieldDescriptor {
            field: FormField::Reason,
            kind: FieldKind::Textarea,
            label: "Reason for appointment",
            placeholder: Some("ex: Annual monthly check-up"),
            required: schema.is_required(FormField::Reason),
            options: Vec::new(),
        },
        FieldDescriptor {
            field: FormField::Note,
            kind: FieldKind::Textarea,
            label: "Notes",
            placeholder: Some("Enter notes"),
            required: schema.is_required(FormField::Note),
            options: Vec::new(),
        },
    ]
}
