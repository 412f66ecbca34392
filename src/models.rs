use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::metrics::DerivedMetrics;

// ============================================================================
// Enumerated form fields
// ============================================================================

/// A form field whose value must come from a fixed option list.
///
/// Submissions may carry either the human-readable label or the snake_case code.
pub trait Choice: Copy + Sized + 'static {
    /// Request field name, used in validation errors.
    const FIELD: &'static str;

    /// Every option, in display order.
    fn all() -> &'static [Self];

    fn code(self) -> &'static str;

    fn label(self) -> &'static str;

    /// Looks up an option by label or code (case-insensitive on the code).
    fn from_input(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.label() == raw || c.code().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    EstudioJuridico,
    PymeTech,
    Salud,
    Comercio,
    Industria,
}

impl Choice for Industry {
    const FIELD: &'static str = "industry";

    fn all() -> &'static [Self] {
        &[
            Industry::EstudioJuridico,
            Industry::PymeTech,
            Industry::Salud,
            Industry::Comercio,
            Industry::Industria,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Industry::EstudioJuridico => "estudio_juridico",
            Industry::PymeTech => "pyme_tech",
            Industry::Salud => "salud",
            Industry::Comercio => "comercio",
            Industry::Industria => "industria",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Industry::EstudioJuridico => "Estudio Jurídico",
            Industry::PymeTech => "PyME Tech",
            Industry::Salud => "Salud",
            Industry::Comercio => "Comercio",
            Industry::Industria => "Industria",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Ars,
    Usd,
}

impl Choice for Currency {
    const FIELD: &'static str = "currency";

    fn all() -> &'static [Self] {
        &[Currency::Ars, Currency::Usd]
    }

    fn code(self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Currency::Ars => "ARS (Pesos)",
            Currency::Usd => "USD (Dólares)",
        }
    }
}

/// Ordered severity of a questionnaire answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub const ALL: [SeverityTier; 3] = [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High];

    pub fn code(self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// The three questionnaire categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityCategory {
    DevicePolicy,
    BackupPolicy,
    AccessControl,
}

impl VulnerabilityCategory {
    pub const ALL: [VulnerabilityCategory; 3] = [
        VulnerabilityCategory::DevicePolicy,
        VulnerabilityCategory::BackupPolicy,
        VulnerabilityCategory::AccessControl,
    ];

    /// Request field name.
    pub fn field(self) -> &'static str {
        match self {
            VulnerabilityCategory::DevicePolicy => "device_policy",
            VulnerabilityCategory::BackupPolicy => "backup_policy",
            VulnerabilityCategory::AccessControl => "access_control",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            VulnerabilityCategory::DevicePolicy => "¿Uso de Dispositivos Personales (BYOD)?",
            VulnerabilityCategory::BackupPolicy => "¿Estado de los Backups?",
            VulnerabilityCategory::AccessControl => "¿Si tu técnico de confianza desaparece hoy?",
        }
    }

    /// Answer text shown for a tier of this category.
    pub fn answer_label(self, tier: SeverityTier) -> &'static str {
        use SeverityTier::*;
        use VulnerabilityCategory::*;
        match (self, tier) {
            (DevicePolicy, Low) => "No, todo es corporativo y bloqueado",
            (DevicePolicy, Medium) => "Híbrido (algunos usan personal)",
            (DevicePolicy, High) => "Sí, todos usan su propio equipo (Alto Riesgo)",
            (BackupPolicy, Low) => "Automatizados y probados mensualmente",
            (BackupPolicy, Medium) => "Manuales / Nunca probados",
            (BackupPolicy, High) => "No tenemos backups centralizados",
            (AccessControl, Low) => "Tengo las claves y el control total",
            (AccessControl, Medium) => "Tengo las claves pero no sé usarlas",
            (AccessControl, High) => "Quedo totalmente bloqueado (Rehén)",
        }
    }

    /// Parses an answer given as its label or as a tier code.
    pub fn parse_answer(self, raw: &str) -> Option<SeverityTier> {
        let raw = raw.trim();
        SeverityTier::ALL
            .into_iter()
            .find(|&tier| self.answer_label(tier) == raw || tier.code().eq_ignore_ascii_case(raw))
    }
}

// ============================================================================
// Schema variants
// ============================================================================

/// Field-set configuration shared by the prompt builder and the reply parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Display amount, message, fragility, tips.
    #[default]
    Basic,
    /// Adds the numeric loss value used by the comparison chart.
    Extended,
    /// Email-gated form: numeric loss plus a preview teaser.
    LeadGated,
}

impl SchemaVariant {
    pub const ALL: [SchemaVariant; 3] = [
        SchemaVariant::Basic,
        SchemaVariant::Extended,
        SchemaVariant::LeadGated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVariant::Basic => "basic",
            SchemaVariant::Extended => "extended",
            SchemaVariant::LeadGated => "lead_gated",
        }
    }

    /// Whether `monto_num` is requested and required.
    pub fn requires_numeric_loss(self) -> bool {
        !matches!(self, SchemaVariant::Basic)
    }

    /// Whether `preview` is requested and required.
    pub fn requires_preview(self) -> bool {
        matches!(self, SchemaVariant::LeadGated)
    }

    /// Whether the submitter must provide a valid email.
    pub fn requires_email(self) -> bool {
        matches!(self, SchemaVariant::LeadGated)
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown schema variant '{}'", s))
    }
}

// ============================================================================
// Validated input
// ============================================================================

/// Business profile after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileInput {
    pub industry: Industry,
    pub employees: u32,
    pub monthly_revenue: f64,
    pub currency: Currency,
    /// Trimmed; may be empty.
    pub company_name: String,
    /// Normalized (trimmed, lowercase). Always present in the lead-gated variant.
    pub email: Option<String>,
}

/// Questionnaire answers after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VulnerabilityAnswers {
    pub device_policy: SeverityTier,
    pub backup_policy: SeverityTier,
    pub access_control: SeverityTier,
}

impl VulnerabilityAnswers {
    pub fn answer(&self, category: VulnerabilityCategory) -> SeverityTier {
        match category {
            VulnerabilityCategory::DevicePolicy => self.device_policy,
            VulnerabilityCategory::BackupPolicy => self.backup_policy,
            VulnerabilityCategory::AccessControl => self.access_control,
        }
    }
}

// ============================================================================
// Model reply
// ============================================================================

/// Schema-validated model reply. Serializes back to the wire field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Estimated loss as a display string (e.g. "$ 1.500.000").
    #[serde(rename = "monto")]
    pub loss_display: String,
    #[serde(rename = "monto_num", skip_serializing_if = "Option::is_none")]
    pub loss_value: Option<f64>,
    /// Executive summary.
    #[serde(rename = "mensaje")]
    pub message: String,
    /// Fragility score in [0, 100].
    #[serde(rename = "fragilidad")]
    pub fragility: u8,
    pub tips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

// ============================================================================
// HTTP payloads
// ============================================================================

const DEFAULT_EMPLOYEES: u32 = 5;

fn default_employees() -> f64 {
    f64::from(DEFAULT_EMPLOYEES)
}

fn default_monthly_revenue() -> f64 {
    1_000_000.0
}

/// Raw form submission as received over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub industry: String,
    /// Accepted as any JSON number so fractional or oversized counts reach
    /// range validation instead of failing deserialization.
    #[serde(default = "default_employees")]
    pub employees: f64,
    #[serde(default = "default_monthly_revenue")]
    pub monthly_revenue: f64,
    pub currency: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub device_policy: String,
    pub backup_policy: String,
    pub access_control: String,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub variant: Option<SchemaVariant>,
}

/// Everything a renderer needs to show results for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub submission_id: Uuid,
    pub variant: SchemaVariant,
    pub company_name: String,
    pub industry: String,
    pub currency: String,
    pub assessment: RiskAssessment,
    pub metrics: DerivedMetrics,
    /// Outbound checkout link, lead-gated variant only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOptions {
    pub field: &'static str,
    pub question: &'static str,
    /// Ordered low, medium, high.
    pub options: Vec<ChoiceOption>,
}

/// Option lists for every enumerated form field.
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub industries: Vec<ChoiceOption>,
    pub currencies: Vec<ChoiceOption>,
    pub questions: Vec<QuestionOptions>,
    pub variants: Vec<&'static str>,
    pub default_employees: u32,
    pub default_monthly_revenue: f64,
}

fn choice_options<C: Choice>() -> Vec<ChoiceOption> {
    C::all()
        .iter()
        .map(|c| ChoiceOption {
            code: c.code(),
            label: c.label(),
        })
        .collect()
}

impl FormOptions {
    pub fn build() -> Self {
        Self {
            industries: choice_options::<Industry>(),
            currencies: choice_options::<Currency>(),
            questions: VulnerabilityCategory::ALL
                .into_iter()
                .map(|category| QuestionOptions {
                    field: category.field(),
                    question: category.question(),
                    options: SeverityTier::ALL
                        .into_iter()
                        .map(|tier| ChoiceOption {
                            code: tier.code(),
                            label: category.answer_label(tier),
                        })
                        .collect(),
                })
                .collect(),
            variants: SchemaVariant::ALL.into_iter().map(SchemaVariant::as_str).collect(),
            default_employees: DEFAULT_EMPLOYEES,
            default_monthly_revenue: default_monthly_revenue(),
        }
    }
}
