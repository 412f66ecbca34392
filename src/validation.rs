/// Input validation for form submissions
///
/// Turns a raw `AssessmentRequest` into a validated `ProfileInput` and
/// `VulnerabilityAnswers` pair. Nothing downstream runs on a failed validation.
use crate::errors::AppError;
use crate::models::{
    AssessmentRequest, Choice, Currency, Industry, ProfileInput, SchemaVariant, SeverityTier,
    VulnerabilityAnswers, VulnerabilityCategory,
};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    // local@domain.tld, ASCII word characters plus dots and hyphens, at least one dot in the domain
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+$")
            .expect("email pattern is a valid regex")
    })
}

/// Validate email address format (`local@domain.tld`).
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validated employee count: a whole number, at least 1, representable as `u32`.
pub fn validate_employees(raw: f64) -> Result<u32, AppError> {
    let invalid = |message: String| AppError::InvalidRange {
        field: "employees".to_string(),
        message,
    };

    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err(invalid(format!("must be a whole number, got {}", raw)));
    }
    if raw < 1.0 {
        return Err(invalid(format!("must be at least 1, got {}", raw)));
    }
    if raw > f64::from(u32::MAX) {
        return Err(invalid(format!("{} exceeds the supported maximum", raw)));
    }
    Ok(raw as u32)
}

/// Validated monthly revenue: finite and not negative.
pub fn validate_revenue(raw: f64) -> Result<f64, AppError> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(AppError::InvalidRange {
            field: "monthly_revenue".to_string(),
            message: format!("must be a non-negative amount, got {}", raw),
        });
    }
    // -0.0 would otherwise render as "-0" in the prompt
    Ok(raw + 0.0)
}

/// Resolves an enumerated field against its option list.
pub fn validate_choice<C: Choice>(raw: &str) -> Result<C, AppError> {
    C::from_input(raw).ok_or_else(|| AppError::InvalidChoice {
        field: C::FIELD.to_string(),
        value: raw.to_string(),
    })
}

/// Normalizes and checks the email.
///
/// In variants that require it, a missing or malformed email is a hard failure.
/// Elsewhere a non-empty email is carried through trimmed and lowercased, unchecked.
pub fn validate_email(raw: Option<&str>, required: bool) -> Result<Option<String>, AppError> {
    let email = raw
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    if !required {
        return Ok(email);
    }

    match email {
        None => Err(AppError::InvalidEmail("email is required".to_string())),
        Some(e) if !is_valid_email(&e) => {
            tracing::warn!("❌ Invalid email format: {}", e);
            Err(AppError::InvalidEmail(format!("'{}' is not a valid address", e)))
        }
        Some(e) => Ok(Some(e)),
    }
}

fn validate_answer(category: VulnerabilityCategory, raw: &str) -> Result<SeverityTier, AppError> {
    category
        .parse_answer(raw)
        .ok_or_else(|| AppError::InvalidChoice {
            field: category.field().to_string(),
            value: raw.to_string(),
        })
}

/// Validates a full submission for the given variant.
pub fn validate_submission(
    request: &AssessmentRequest,
    variant: SchemaVariant,
) -> Result<(ProfileInput, VulnerabilityAnswers), AppError> {
    let industry: Industry = validate_choice(&request.industry)?;
    let employees = validate_employees(request.employees)?;
    let monthly_revenue = validate_revenue(request.monthly_revenue)?;
    let currency: Currency = validate_choice(&request.currency)?;

    let answers = VulnerabilityAnswers {
        device_policy: validate_answer(VulnerabilityCategory::DevicePolicy, &request.device_policy)?,
        backup_policy: validate_answer(VulnerabilityCategory::BackupPolicy, &request.backup_policy)?,
        access_control: validate_answer(
            VulnerabilityCategory::AccessControl,
            &request.access_control,
        )?,
    };

    let email = validate_email(request.email.as_deref(), variant.requires_email())?;

    let profile = ProfileInput {
        industry,
        employees,
        monthly_revenue,
        currency,
        company_name: request
            .company_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        email,
    };

    tracing::debug!(
        "✓ Submission valid: industry={}, employees={}, variant={}",
        profile.industry.code(),
        profile.employees,
        variant
    );

    Ok((profile, answers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AssessmentRequest {
        AssessmentRequest {
            industry: "Salud".to_string(),
            employees: 12.0,
            monthly_revenue: 2_500_000.0,
            currency: "ARS (Pesos)".to_string(),
            company_name: Some("  Clínica Norte ".to_string()),
            email: Some(" Admin@Clinica.com ".to_string()),
            device_policy: "Híbrido (algunos usan personal)".to_string(),
            backup_policy: "high".to_string(),
            access_control: "Tengo las claves y el control total".to_string(),
            variant: None,
        }
    }

    #[test]
    fn test_valid_submission_is_normalized() {
        let (profile, answers) = validate_submission(&request(), SchemaVariant::LeadGated).unwrap();

        assert_eq!(profile.industry, Industry::Salud);
        assert_eq!(profile.currency, Currency::Ars);
        assert_eq!(profile.company_name, "Clínica Norte");
        assert_eq!(profile.email.as_deref(), Some("admin@clinica.com"));
        assert_eq!(answers.device_policy, SeverityTier::Medium);
        assert_eq!(answers.backup_policy, SeverityTier::High);
        assert_eq!(answers.access_control, SeverityTier::Low);
    }

    #[test]
    fn test_email_only_checked_when_required() {
        let mut req = request();
        req.email = Some("not-an-email".to_string());

        assert!(validate_submission(&req, SchemaVariant::Basic).is_ok());
        let err = validate_submission(&req, SchemaVariant::LeadGated).unwrap_err();
        assert_eq!(err.kind(), "invalid_email");
    }

    #[test]
    fn test_employee_bounds() {
        assert!(validate_employees(0.0).is_err());
        assert!(validate_employees(-3.0).is_err());
        assert!(validate_employees(f64::from(u32::MAX) + 1.0).is_err());
        assert!(validate_employees(f64::NAN).is_err());
        assert_eq!(validate_employees(1.0).unwrap(), 1);
        assert_eq!(validate_employees(250.0).unwrap(), 250);
    }

    #[test]
    fn test_fractional_employees_is_range_error() {
        match validate_employees(2.5) {
            Err(AppError::InvalidRange { field, .. }) => assert_eq!(field, "employees"),
            other => panic!("expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_zero_revenue_normalized() {
        let revenue = validate_revenue(-0.0).unwrap();
        assert!(revenue.is_sign_positive());
        assert_eq!(format!("{}", revenue), "0");
    }

    #[test]
    fn test_revenue_rejects_nan() {
        assert!(validate_revenue(f64::NAN).is_err());
        assert!(validate_revenue(f64::INFINITY).is_err());
        assert_eq!(validate_revenue(0.0).unwrap(), 0.0);
    }
}
