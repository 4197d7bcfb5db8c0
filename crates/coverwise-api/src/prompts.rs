//! Prompt text for extraction and comparison requests.

use chrono::NaiveDate;

use coverwise_core::{ExtractedDocument, MatchResult, Result};

/// Date layout used when telling the model what "today" is.
pub const PROMPT_DATE_FORMAT: &str = "%d-%b-%Y";

const EXTRACTION_SCHEMA: &str = r#"{
  "company": "",
  "plan": "",
  "premium": "",
  "coverage": "",
  "policy_details": { "start_date": "", "vintage": "", "plan": "" },
  "sum_insured": {
    "total": "",
    "components": [ { "label": "", "value": "" } ]
  },
  "policy_holders": [ { "name": "", "dob": "", "age": "" } ],
  "features_found": { "room_rent": "", "ncb": "", "restoration": "", "ped_wait": "", "copay": "" },
  "comprehensive_findings": ""
}"#;

const COMPARISON_SCHEMA: &str = r#"{
  "feature_analysis": [
    { "category": "Non-Negotiable Benefits", "feature": "Infinite Care", "status": "Positive", "value": "Available" },
    { "category": "Must Have", "feature": "Room Rent", "status": "Negative", "value": "Capped at 1%" }
  ],
  "product_score": 7.5,
  "current_policy_stats": {
    "company": "",
    "csr": "98.5%", "csr_rank": "3",
    "solvency": "1.8", "solvency_rank": "1",
    "complaints": "95%", "complaints_rank": "4"
  },
  "recommendations": [
    {
      "category": "Upgrade: <current policy type> (Better Coverage)",
      "items": [
        {
          "company": "",
          "name": "",
          "type": "",
          "product_score": 9.2,
          "premium": "₹20,000 - ₹25,000",
          "description": "USP: ...",
          "stats": { "csr": "", "csr_rank": "", "solvency": "", "solvency_rank": "", "complaints": "", "complaints_rank": "" },
          "benefits": [""],
          "non_negotiable": [ { "feature": "", "existing": "", "proposed": "", "status": "Upgrade" } ],
          "must_have": [ { "feature": "", "existing": "", "proposed": "", "status": "" } ],
          "good_to_have": [ { "feature": "", "existing": "", "proposed": "", "status": "" } ],
          "special_features": [ { "feature": "", "existing": "", "proposed": "", "status": "" } ],
          "red_flags": [""]
        }
      ]
    }
  ],
  "pros": [""],
  "cons": [""]
}"#;

/// Prompt for extracting policy facts from an attached document.
pub fn extraction_prompt(features: &str, today: NaiveDate) -> String {
    let today = today.format(PROMPT_DATE_FORMAT);
    format!(
        r#"Analyze the attached health insurance policy document.

REFERENCE FEATURES LIST:
{features}

INSTRUCTIONS:
1. company: the insurer's full legal name as printed (for example "HDFC ERGO General Insurance Company Ltd."), never an abbreviation.
2. policy_details.start_date: the policy start, inception, risk start or first inception date, copied exactly as printed. policy_details.plan: the plan name. policy_details.vintage: time from the start date to {today}.
3. policy_holders: every insured person with name, date of birth and age as of {today}.
4. sum_insured.components: every absolute amount that makes up the cover. Use the labels "Base Sum Insured", "Cumulative Bonus", "Super No Claim Bonus", "Recharge Benefit" and "Deductible". Read the notes under tables for bonus shields or super bonuses. Skip percentages; only currency amounts belong here.
5. Check the document for every feature in the reference list and record its limit, waiting period or condition in features_found.
6. comprehensive_findings: one text block listing every feature found with its detail.

Return only JSON with this shape:
{schema}
"#,
        features = features,
        today = today,
        schema = EXTRACTION_SCHEMA,
    )
}

/// Instruction added when the insurer is missing from the performance data.
pub const OTHERS_FALLBACK_INSTRUCTION: &str = r#"The existing policy's company does not appear in Reference Data 2.
Use the "Others" row of Reference Data 2 for csr, complaints, solvency and tier in current_policy_stats."#;

/// Prompt section carrying a verified plan dataset row.
pub fn verified_section(matched: &MatchResult, company_column: &str, plan_column: &str) -> String {
    format!(
        r#"VERIFIED DATABASE MATCH FOR CURRENT POLICY:
Match: "{plan}" by "{company}" (similarity {score:.2})
OFFICIAL DATA SPECS: {specs}
Use these specs for any detail missing from the document."#,
        plan = matched.row.get_or_empty(plan_column),
        company = matched.row.get_or_empty(company_column),
        score = matched.score,
        specs = matched.summary(),
    )
}

/// Inputs to the comparison prompt.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonContext<'a> {
    pub document: &'a ExtractedDocument,
    /// Locally computed tenure, e.g. `"3 Years 7 Months"` or `"Unknown"`.
    pub tenure: &'a str,
    pub company_known: bool,
    pub verified: Option<&'a str>,
    pub features_csv: &'a str,
    pub company_csv: &'a str,
    pub plans_csv: &'a str,
}

/// Prompt for comparing an extracted policy against the market.
pub fn comparison_prompt(ctx: &ComparisonContext<'_>) -> Result<String> {
    let doc = ctx.document;
    let document_json = serde_json::to_string(doc)?;
    let fallback = if ctx.company_known {
        ""
    } else {
        OTHERS_FALLBACK_INSTRUCTION
    };
    let first_age = doc
        .policy_holders
        .first()
        .map(|h| h.age.as_str())
        .filter(|age| !age.is_empty())
        .unwrap_or("30");

    Ok(format!(
        r#"Act as an expert health insurance advisor.
{fallback}

EXISTING POLICY DATA (source of truth):
- Basic info: {document_json}
- Reported policy vintage: {vintage}
- CALCULATED TENURE (use for waiting period analysis): {tenure}
- Detailed found features: {findings}

{verified}

The existing policy company is "{company}". If a feature is not mentioned for the existing policy, say "Not Available".

REFERENCE DATA 1 (feature classification: Feature, Classification, One-liner Explanation):
{features_csv}

REFERENCE DATA 2 (company performance: claims paid ratio, repudiation, complaints settlement, solvency, tier):
{company_csv}

REFERENCE DATA 3 (plan database, the only valid source for plan names, premiums and limits):
{plans_csv}

INSTRUCTIONS:
1. Waiting periods: treat {tenure} as time served. Mark pre-existing disease and specific illness waiting periods as covered when time served exceeds them, otherwise state the time remaining.
2. feature_analysis: evaluate every feature of Reference Data 1 against the existing policy, status "Positive" or "Negative", in the order Non-Negotiable, Must Have, Good to Have, Special.
3. product_score: positive Non-Negotiable and Must Have features over all such features, times 10.
4. current_policy_stats: look the existing company up in Reference Data 2. Ranks are numbers only.
5. recommendations: three fully detailed plans from Reference Data 3, ordered by claims paid ratio, highest first. Company names without tier annotations. Descriptions start with "USP:". Premiums are realistic ranges for a holder aged {age}; never ask the user to search.
6. Within each recommendation list every Non-Negotiable, Must Have and Good to Have feature, six to seven Special Features, and red flags. Set a feature status to "Upgrade" only for significant improvements, otherwise leave it empty.
7. pros: features the existing policy has, as "Feature: detail. Explanation". cons: features it lacks or limits, in the same format, including red flags present.

Return only JSON with this shape:
{schema}
"#,
        fallback = fallback,
        document_json = document_json,
        vintage = doc.policy_details.vintage,
        tenure = ctx.tenure,
        findings = doc.comprehensive_findings,
        verified = ctx.verified.unwrap_or(""),
        company = doc.company,
        features_csv = ctx.features_csv,
        company_csv = ctx.company_csv,
        plans_csv = ctx.plans_csv,
        age = first_age,
        schema = COMPARISON_SCHEMA,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverwise_core::{PolicyHolder, ReferenceRow};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_extraction_prompt_embeds_features_and_date() {
        let prompt = extraction_prompt("Room Rent, NCB", today());
        assert!(prompt.contains("Room Rent, NCB"));
        assert!(prompt.contains("10-Jan-2024"));
        assert!(prompt.contains("\"sum_insured\""));
    }

    fn context<'a>(doc: &'a ExtractedDocument, known: bool, verified: Option<&'a str>) -> ComparisonContext<'a> {
        ComparisonContext {
            document: doc,
            tenure: "3 Years 7 Months",
            company_known: known,
            verified,
            features_csv: "Feature,Classification",
            company_csv: "Company Name,Claims Paid Ratio",
            plans_csv: "Insurance Company,Base Plan Name",
        }
    }

    #[test]
    fn test_comparison_prompt_known_company() {
        let doc = ExtractedDocument {
            company: "HDFC ERGO".to_string(),
            policy_holders: vec![PolicyHolder::new("Asha", "15/06/1990", "33")],
            ..Default::default()
        };
        let prompt = comparison_prompt(&context(&doc, true, None)).unwrap();

        assert!(prompt.contains("CALCULATED TENURE (use for waiting period analysis): 3 Years 7 Months"));
        assert!(prompt.contains("\"HDFC ERGO\""));
        assert!(prompt.contains("aged 33"));
        assert!(!prompt.contains("\"Others\" row"));
    }

    #[test]
    fn test_comparison_prompt_unknown_company_uses_others() {
        let doc = ExtractedDocument::default();
        let prompt = comparison_prompt(&context(&doc, false, Some("VERIFIED DATABASE MATCH"))).unwrap();

        assert!(prompt.contains("\"Others\" row"));
        assert!(prompt.contains("VERIFIED DATABASE MATCH"));
        assert!(prompt.contains("aged 30"));
    }

    #[test]
    fn test_verified_section() {
        let matched = MatchResult {
            row: ReferenceRow::new([
                ("Insurance Company", "HDFC ERGO General Insurance"),
                ("Base Plan Name", "Optima Secure"),
                ("Co-pay", "Not Applicable"),
            ]),
            score: 1.0,
            raw_score: 1.1,
            query_org: "hdfc ergo".to_string(),
            query_plan: "optima secure".to_string(),
        };
        let section = verified_section(&matched, "Insurance Company", "Base Plan Name");

        assert!(section.contains("Match: \"Optima Secure\" by \"HDFC ERGO General Insurance\""));
        assert!(section.contains("similarity 1.00"));
        assert!(!section.contains("Not Applicable"));
    }
}
