/// Property-based tests using proptest
/// Checks properties of validation, prompt building, and reply parsing over generated inputs
use dli_risk_audit::models::{
    AssessmentRequest, Choice, Currency, Industry, RiskAssessment, SchemaVariant, SeverityTier,
    VulnerabilityCategory,
};
use dli_risk_audit::parser::parse_reply;
use dli_risk_audit::prompt::build_prompt;
use dli_risk_audit::validation::{is_valid_email, validate_submission};
use proptest::prelude::*;

fn industry() -> impl Strategy<Value = Industry> {
    prop::sample::select(Industry::all().to_vec())
}

fn currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::all().to_vec())
}

fn tier() -> impl Strategy<Value = SeverityTier> {
    prop::sample::select(SeverityTier::ALL.to_vec())
}

fn variant() -> impl Strategy<Value = SchemaVariant> {
    prop::sample::select(SchemaVariant::ALL.to_vec())
}

prop_compose! {
    fn valid_request()(
        industry in industry(),
        currency in currency(),
        employees in (1u32..100_000).prop_map(f64::from),
        monthly_revenue in 0.0f64..1e12,
        company_name in "[A-Za-z ]{0,20}",
        device in tier(),
        backup in tier(),
        access in tier(),
        variant in variant(),
    ) -> AssessmentRequest {
        AssessmentRequest {
            industry: industry.label().to_string(),
            employees,
            monthly_revenue,
            currency: currency.code().to_string(),
            company_name: Some(company_name),
            email: Some("lead@example.com".to_string()),
            device_policy: VulnerabilityCategory::DevicePolicy.answer_label(device).to_string(),
            backup_policy: VulnerabilityCategory::BackupPolicy.answer_label(backup).to_string(),
            access_control: VulnerabilityCategory::AccessControl.answer_label(access).to_string(),
            variant: Some(variant),
        }
    }
}

// Property: prompt building is a pure function of its input
proptest! {
    #[test]
    fn prompt_is_byte_identical_across_calls(request in valid_request()) {
        let variant = request.variant.unwrap_or_default();
        let (profile, answers) = validate_submission(&request, variant).unwrap();

        let first = build_prompt(&profile, &answers, variant).user_message();
        let second = build_prompt(&profile, &answers, variant).user_message();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn employees_below_one_rejected(request in valid_request(), employees in -1e9f64..1.0) {
        let mut request = request;
        request.employees = employees;
        let err = validate_submission(&request, SchemaVariant::Basic).unwrap_err();
        prop_assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn negative_revenue_rejected(request in valid_request(), revenue in -1e12f64..-1e-9) {
        let mut request = request;
        request.monthly_revenue = revenue;
        let err = validate_submission(&request, SchemaVariant::Basic).unwrap_err();
        prop_assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn unknown_industry_rejected(request in valid_request(), industry in "[a-z]{12,20}") {
        let mut request = request;
        request.industry = industry;
        let err = validate_submission(&request, SchemaVariant::Basic).unwrap_err();
        prop_assert_eq!(err.kind(), "invalid_choice");
    }
}

// Property: email validation
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_accepted(
        local in "[a-z0-9_.-]{1,10}",
        domain in "[a-z0-9-]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email), "rejected: {}", email);
    }

    #[test]
    fn emails_without_domain_dot_rejected(local in "[a-z]{1,10}", domain in "[a-z]{1,10}") {
        let email = format!("{}@{}", local, domain);
        prop_assert!(!is_valid_email(&email));
    }
}

// Property: reply parsing
proptest! {
    #[test]
    fn parser_never_panics(raw in "\\PC*", variant in variant()) {
        let _ = parse_reply(&raw, variant);
    }

    #[test]
    fn fragility_in_range_accepted(score in 0i64..=100) {
        let raw = format!(r#"{{"monto":"$1","mensaje":"x","fragilidad":{}}}"#, score);
        let assessment = parse_reply(&raw, SchemaVariant::Basic).unwrap();
        prop_assert_eq!(i64::from(assessment.fragility), score);
    }

    #[test]
    fn fragility_out_of_range_rejected(score in prop_oneof![i64::MIN..0, 101i64..i64::MAX]) {
        let raw = format!(r#"{{"monto":"$1","mensaje":"x","fragilidad":{}}}"#, score);
        let err = parse_reply(&raw, SchemaVariant::Basic).unwrap_err();
        prop_assert_eq!(err.kind(), "schema_violation");
    }

    #[test]
    fn reparse_of_valid_assessment_is_stable(
        loss_display in "\\$ [0-9.]{1,12}",
        loss_value in prop::option::of((0u64..1_000_000_000_000).prop_map(|v| v as f64)),
        message in "[A-Za-z ,.]{1,40}",
        fragility in 0u8..=100,
        tips in prop::collection::vec("[A-Za-z][A-Za-z ]{0,20}", 0..5),
        preview in prop::option::of("[A-Za-z ]{1,30}"),
    ) {
        let assessment = RiskAssessment {
            loss_display,
            loss_value,
            message,
            fragility,
            tips,
            preview,
        };
        let serialized = serde_json::to_string(&assessment).unwrap();
        let fenced = format!("```json\n{}\n```", serialized);

        let reparsed = parse_reply(&fenced, SchemaVariant::Basic).unwrap();
        prop_assert_eq!(reparsed, assessment);
    }
}
