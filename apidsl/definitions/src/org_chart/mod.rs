//! Organisation chart design.
//!
//! Employees reference their manager and their reports, and departments are
//! a user type pointing back at employees, so the type graph is cyclic both
//! directly and through an intermediate type.

use apidsl_define::prelude::*;

pub const EMPLOYEE: &str = "application/vnd.employee+json";

/// Creates the org chart design with default configuration.
///
/// ## Examples
///
/// ```rust
/// use apidsl_definitions::org_chart::define_org_chart_design;
///
/// let mut design = define_org_chart_design();
/// design.run().unwrap();
/// assert_eq!(design.registry().user_types().count(), 1);
/// ```
pub fn define_org_chart_design() -> Design {
    define_org_chart_design_with(DesignConfig::default())
}

pub fn define_org_chart_design_with(config: DesignConfig) -> Design {
    let mut design = Design::with_config(config);

    design.user_type("Department", |t| {
        t.description("A department and the employee heading it");
        t.attribute("name").of(Primitive::String).min_length(2);
        t.attribute("head").of(EMPLOYEE);
        t.required(["name"]);
    });

    let employee = design.media_type(EMPLOYEE, |m| {
        let me = m.id();
        let reports = m.collection_of(me);
        m.attribute("id").of(Primitive::Uuid);
        m.attribute("name").of(Primitive::String);
        m.attribute("email").format(Format::Email);
        m.attribute("manager").of(me);
        m.attribute("reports").of(reports);
        m.attribute("department").of("Department");
        m.links(|l| l.link("manager"));

        m.view("default", |v| {
            v.attribute("id");
            v.attribute("name");
            v.attribute("manager");
            v.attribute("reports");
            v.attribute("department");
        });
        m.view("link", |v| {
            v.attribute("id");
            v.attribute("name");
        });
    });

    design.resource("employee", move |r| {
        r.media(employee);
        r.action("show", |a| {
            a.response("OK", 200);
        });
        r.action("reports", move |a| {
            a.response("OK", 200)
                .media(format!("{EMPLOYEE}; type=collection"))
                .view("link");
        });
    });

    design
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn org_chart_design_is_valid() {
        let mut design = define_org_chart_design_with(DesignConfig::seeded(1));
        design.run().unwrap();
    }

    #[test]
    fn manager_example_stops_at_one_level() {
        let mut design = define_org_chart_design_with(DesignConfig::seeded(2));
        design.run().unwrap();
        let registry = design.registry();
        let employee = registry.media_type(registry.find_media_type(EMPLOYEE).unwrap());

        let manager = employee.attribute_named("manager").unwrap().example.value().unwrap();
        assert!(manager["name"].is_string());
        assert_eq!(manager["manager"], json!({}));
        let reports = manager["reports"].as_array().unwrap();
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| r == &json!({})));
    }

    #[test]
    fn department_cycle_terminates() {
        let mut design = define_org_chart_design_with(DesignConfig::seeded(3));
        design.run().unwrap();
        let registry = design.registry();
        let department = registry.user_type(registry.find_user_type("Department").unwrap());

        let root = department.attribute.example.value().unwrap();
        let head = &root["head"];
        assert!(head["id"].is_string());
        assert!(head["department"]["name"].is_string());
        assert_eq!(head["department"]["head"], json!({}));
    }

    #[test]
    fn reports_response_resolves_collection_by_identifier() {
        let mut design = define_org_chart_design();
        design.run().unwrap();
        let registry = design.registry();
        let resource = registry.resource(registry.find_resource("employee").unwrap());
        let media = resource.actions["reports"].responses["OK"].resolved_media.unwrap();
        assert_eq!(registry.media_type(media).type_name, "EmployeeCollection");
    }
}
