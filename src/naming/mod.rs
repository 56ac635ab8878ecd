//! Display names derived from product attributes.
//!
//! The final policy name is the production name of a product configuration.
//! Every testing entry on the coordination and review lists is keyed by the
//! self-service name `"<final> (Testing) v<version>"`.

use url::form_urlencoded;

/// Path of the test report form, relative to the site URL
const TEST_REPORT_FORM: &str = "Lists/Jamf_Item_Test/DispForm.aspx";

/// Label appended to the test report link
const TEST_REPORT_LABEL: &str = "Test Report";

/// Raw product attributes as supplied by the packaging run
#[derive(Debug, Clone, Default)]
pub struct ProductAttributes {
    pub name: String,
    pub major_version: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub platform: Option<String>,
}

/// Names used by one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyNames {
    /// Key of the content list entry
    pub final_name: String,
    /// Name of the testing policy, without version
    pub policy_name: String,
    /// Key of the test coordination and test review entries
    pub self_service_name: String,
}

impl PolicyNames {
    /// Names for an untested run, derived from the product attributes.
    pub fn untested(product: &ProductAttributes, version: &str) -> Self {
        Self::release(&final_policy_name(product), version)
    }

    /// Names for a release run, where the final name is supplied directly.
    pub fn release(final_name: &str, version: &str) -> Self {
        Self {
            final_name: final_name.to_string(),
            policy_name: format!("{} (Testing)", final_name),
            self_service_name: self_service_policy_name(final_name, version),
        }
    }
}

/// Build the final policy name.
///
/// Segments follow the fixed order name, major version, language, license,
/// platform. Absent or empty segments are left out.
pub fn final_policy_name(product: &ProductAttributes) -> String {
    let mut name = product.name.clone();
    let suffixes = [
        &product.major_version,
        &product.language,
        &product.license,
        &product.platform,
    ];
    for segment in suffixes.into_iter().flatten() {
        if !segment.is_empty() {
            name.push(' ');
            name.push_str(segment);
        }
    }
    name
}

/// `"<final> (Testing) v<version>"`, used in both untested and release runs
pub fn self_service_policy_name(final_name: &str, version: &str) -> String {
    format!("{} (Testing) v{}", final_name, version)
}

/// Value of the content list `Test Report` column: a link to the test report
/// form filtered on the self-service name, followed by its label.
pub fn test_report_link(site_url: &str, self_service_name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("Title", self_service_name)
        .finish();
    format!(
        "{}/{}?{}, {}",
        site_url.trim_end_matches('/'),
        TEST_REPORT_FORM,
        query,
        TEST_REPORT_LABEL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> ProductAttributes {
        ProductAttributes {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_final_name_without_suffixes() {
        assert_eq!(final_policy_name(&product("Foo")), "Foo");
    }

    #[test]
    fn test_final_name_all_segments_in_order() {
        let attrs = ProductAttributes {
            name: "Office".to_string(),
            major_version: Some("2021".to_string()),
            language: Some("DE".to_string()),
            license: Some("Volume".to_string()),
            platform: Some("arm64".to_string()),
        };
        assert_eq!(final_policy_name(&attrs), "Office 2021 DE Volume arm64");
    }

    #[test]
    fn test_final_name_skips_missing_and_empty_segments() {
        let attrs = ProductAttributes {
            name: "Office".to_string(),
            major_version: None,
            language: Some(String::new()),
            license: Some("Volume".to_string()),
            platform: None,
        };
        assert_eq!(final_policy_name(&attrs), "Office Volume");
    }

    #[test]
    fn test_every_subset_keeps_order_and_single_spaces() {
        let values = ["2", "EN", "Site", "x86"];
        for mask in 0u8..16 {
            let pick = |bit: u8| (mask & (1 << bit) != 0).then(|| values[bit as usize].to_string());
            let attrs = ProductAttributes {
                name: "App".to_string(),
                major_version: pick(0),
                language: pick(1),
                license: pick(2),
                platform: pick(3),
            };
            let expected: Vec<&str> = std::iter::once("App")
                .chain((0..4u8).filter(|b| mask & (1 << b) != 0).map(|b| values[b as usize]))
                .collect();
            assert_eq!(final_policy_name(&attrs), expected.join(" "));
        }
    }

    #[test]
    fn test_untested_names() {
        let names = PolicyNames::untested(&product("Foo"), "1.0");
        assert_eq!(names.final_name, "Foo");
        assert_eq!(names.policy_name, "Foo (Testing)");
        assert_eq!(names.self_service_name, "Foo (Testing) v1.0");
    }

    #[test]
    fn test_release_names_keep_testing_suffix() {
        let names = PolicyNames::release("Foo EN", "2.3.1");
        assert_eq!(names.self_service_name, "Foo EN (Testing) v2.3.1");
    }

    #[test]
    fn test_test_report_link() {
        let link = test_report_link("https://sp.example.com/sites/mac/", "Foo (Testing) v1.0");
        assert_eq!(
            link,
            "https://sp.example.com/sites/mac/Lists/Jamf_Item_Test/DispForm.aspx\
             ?Title=Foo+%28Testing%29+v1.0, Test Report"
        );
    }
}
