//! Wine cellar design.
//!
//! Accounts own bottles. Bottles link back to their account, both media
//! types have collection wrappers, and two resources expose them:
//!
//! | Resource | Action | Responses |
//! |----------|--------|-----------|
//! | account | list | OK (AccountCollection) |
//! | account | show | OK (Account), NotFound (Error) |
//! | bottle | list | OK (BottleCollection, tiny view) |
//! | bottle | show | OK (Bottle), NotFound (Error) |
//! | bottle | rate | NoContent (Bottle), NotFound (Error) |

use apidsl_define::prelude::*;

/// Identifier of the account media type.
pub const ACCOUNT: &str = "application/vnd.account+json";
/// Identifier of the bottle media type.
pub const BOTTLE: &str = "application/vnd.bottle+json";
/// Identifier of the error media type.
pub const ERROR: &str = "application/vnd.goa.error";

/// Bottle colors accepted by the design.
pub const COLORS: [&str; 5] = ["red", "white", "rose", "yellow", "sparkling"];

/// Creates the cellar design with default configuration.
///
/// ## Examples
///
/// ```rust
/// use apidsl_definitions::cellar::define_cellar_design;
///
/// let mut design = define_cellar_design();
/// design.run().unwrap();
/// assert_eq!(design.registry().media_types().count(), 6);
/// assert_eq!(design.registry().resources().count(), 2);
/// ```
pub fn define_cellar_design() -> Design {
    define_cellar_design_with(DesignConfig::default())
}

/// Creates the cellar design with the given configuration.
pub fn define_cellar_design_with(config: DesignConfig) -> Design {
    let mut design = Design::with_config(config);

    design.media_type(ERROR, |m| {
        m.description("Error response media type");
        m.error_media();
        m.attribute("id").of(Primitive::String).description("Unique error ID");
        m.attribute("code")
            .of(Primitive::String)
            .description("An application-specific error code")
            .example("invalid_value");
        m.attribute("detail")
            .of(Primitive::String)
            .description("A human-readable explanation of the problem");
        m.attribute("meta")
            .of(DataType::hash_of(Primitive::String, Primitive::Any))
            .no_example();
        m.view("default", |v| {
            v.attribute("id");
            v.attribute("code");
            v.attribute("detail");
            v.attribute("meta");
        });
    });

    let account = design.media_type(ACCOUNT, |m| {
        m.description("A tenant account");
        m.attribute("id")
            .of(Primitive::Integer)
            .description("ID of account")
            .minimum(0);
        m.attribute("href")
            .of(Primitive::String)
            .description("API href of account")
            .pattern("^/cellar/accounts/[0-9]{1,4}$");
        m.attribute("name")
            .of(Primitive::String)
            .description("Name of account")
            .min_length(2);
        m.attribute("created_at")
            .of(Primitive::DateTime)
            .description("Date of creation");
        m.attribute("created_by")
            .of(Primitive::String)
            .description("Email of account owner")
            .format(Format::Email);
        m.required(["id", "href", "name"]);

        m.view("default", |v| {
            v.attribute("id");
            v.attribute("href");
            v.attribute("name");
            v.attribute("created_at");
            v.attribute("created_by");
        });
        m.view("tiny", |v| {
            v.attribute("id");
            v.attribute("href");
            v.attribute("name");
        });
        m.view("link", |v| {
            v.attribute("id");
            v.attribute("href");
        });
    });

    let bottle = design.media_type(BOTTLE, move |m| {
        m.description("A bottle of wine");
        m.reference("application/vnd.bottle-payload");
        m.attribute("id").of(Primitive::Integer).minimum(0);
        m.attribute("href")
            .of(Primitive::String)
            .pattern("^/cellar/accounts/[0-9]{1,4}/bottles/[0-9]{1,4}$");
        m.attribute("name");
        m.attribute("vineyard");
        m.attribute("varietal");
        m.attribute("vintage");
        m.attribute("color");
        m.attribute("sweetness");
        m.attribute("rating");
        m.attribute("account")
            .of(account)
            .description("Account that owns bottle");
        m.attribute("created_at").of(Primitive::DateTime);
        m.attribute("updated_at").of(Primitive::DateTime);
        m.required(["id", "href", "name", "vintage", "account"]);

        m.links(|l| l.link("account"));

        m.view("default", |v| {
            v.attribute("id");
            v.attribute("href");
            v.attribute("name");
            v.attribute("vineyard");
            v.attribute("varietal");
            v.attribute("vintage");
            v.attribute("color");
            v.attribute("rating");
            v.attribute_with_view("account", "tiny");
        });
        m.view("tiny", |v| {
            v.attribute("id");
            v.attribute("href");
            v.attribute("name");
            v.attribute("rating");
        });
        m.view("full", |v| {
            v.attribute("id");
            v.attribute("href");
            v.attribute("name");
            v.attribute("vineyard");
            v.attribute("varietal");
            v.attribute("vintage");
            v.attribute("color");
            v.attribute("sweetness");
            v.attribute("rating");
            v.attribute("account");
            v.attribute("created_at");
            v.attribute("updated_at");
        });
    });

    // Shared attribute definitions of bottles, inherited through the reference.
    design.media_type("application/vnd.bottle-payload", |m| {
        m.attribute("name").of(Primitive::String).min_length(2);
        m.attribute("vineyard").of(Primitive::String).min_length(2);
        m.attribute("varietal").of(Primitive::String).min_length(4);
        m.attribute("vintage")
            .of(Primitive::Integer)
            .minimum(1900)
            .maximum(2100);
        m.attribute("color").of(Primitive::String).enum_values(COLORS);
        m.attribute("sweetness")
            .of(Primitive::Integer)
            .minimum(1)
            .maximum(5);
        m.attribute("rating")
            .of(Primitive::Integer)
            .minimum(1)
            .maximum(5);
        m.view("default", |v| {
            v.attribute("name");
            v.attribute("vintage");
        });
    });

    let accounts = design.collection_of(account);
    let bottles = design.collection_of(bottle);

    design.resource("account", move |r| {
        r.description("Tenant accounts");
        r.media(account);
        r.action("list", |a| {
            a.description("Retrieve all accounts");
            a.response("OK", 200).media(accounts);
        });
        r.action("show", |a| {
            a.description("Retrieve account with given id");
            a.response("OK", 200);
            a.response("NotFound", 404).media(ERROR);
        });
    });

    design.resource("bottle", move |r| {
        r.description("A wine bottle");
        r.media(BOTTLE);
        r.action("list", |a| {
            a.description("List all bottles in account optionally filtering by year");
            a.response("OK", 200).media(bottles).view("tiny");
        });
        r.action("show", |a| {
            a.response("OK", 200).view("full");
            a.response("NotFound", 404).media(ERROR);
        });
        r.action("rate", |a| {
            a.response("NoContent", 204).description("Rating recorded");
            a.response("NotFound", 404).media(ERROR);
        });
    });

    design
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidsl_define::{DEFAULT_VIEW, Example};

    fn run_seeded(seed: u64) -> Design {
        let mut design = define_cellar_design_with(DesignConfig::seeded(seed));
        design.run().unwrap();
        design
    }

    #[test]
    fn cellar_design_is_valid() {
        let mut design = define_cellar_design();
        assert!(design.run().is_ok());
        assert!(design.errors().is_empty());
    }

    #[test]
    fn bottle_inherits_payload_attributes() {
        let design = run_seeded(1);
        let registry = design.registry();
        let bottle = registry.find_media_type(BOTTLE).unwrap();
        let vintage = registry.media_type(bottle).attribute_named("vintage").unwrap();
        assert_eq!(vintage.data_type.primitive(), Some(Primitive::Integer));
        assert_eq!(vintage.validation.minimum, Some(1900.0));
    }

    #[test]
    fn bottle_links_to_account_link_view() {
        let design = run_seeded(1);
        let registry = design.registry();
        let bottle = registry.media_type(registry.find_media_type(BOTTLE).unwrap());
        let link = &bottle.links["account"];
        assert_eq!(link.view, "link");
        assert_eq!(registry.media_type(link.target).type_name, "Account");
    }

    #[test]
    fn examples_respect_validations() {
        for seed in 0..10 {
            let design = run_seeded(seed);
            let registry = design.registry();
            let bottle = registry.media_type(registry.find_media_type(BOTTLE).unwrap());

            let vintage = bottle.attribute_named("vintage").unwrap().example.value().unwrap();
            let vintage = vintage.as_i64().unwrap();
            assert!(vintage > 1900 && vintage <= 2100);

            let color = bottle.attribute_named("color").unwrap().example.value().unwrap();
            assert!(COLORS.contains(&color.as_str().unwrap()));

            let account = bottle.attribute_named("account").unwrap().example.value().unwrap();
            assert!(account["href"].as_str().unwrap().starts_with("/cellar/accounts/"));
        }
    }

    #[test]
    fn error_meta_has_no_example() {
        let design = run_seeded(2);
        let registry = design.registry();
        let error = registry.media_type(registry.find_media_type(ERROR).unwrap());
        assert!(error.is_error);
        assert_eq!(error.attribute_named("meta").unwrap().example, Example::Absent);
        let view = error.view(DEFAULT_VIEW).unwrap().attribute.example.value().unwrap();
        assert!(view.get("meta").is_none());
    }

    #[test]
    fn bottle_default_view_renders_tiny_account() {
        let design = run_seeded(4);
        let registry = design.registry();
        let bottle = registry.media_type(registry.find_media_type(BOTTLE).unwrap());
        let rendered = bottle.view(DEFAULT_VIEW).unwrap().attribute.example.value().unwrap();
        let account = rendered["account"].as_object().unwrap();
        assert!(account.keys().all(|k| ["id", "href", "name"].contains(&k.as_str())));
        assert!(account.get("created_at").is_none());
        assert!(account.get("created_by").is_none());

        let bottles = registry.find_media_type(&format!("{BOTTLE}; type=collection"));
        let bottles = registry.media_type(bottles.unwrap());
        let tiny = bottles.view("tiny").unwrap().attribute.example.value().unwrap();
        for item in tiny.as_array().unwrap() {
            let item = item.as_object().unwrap();
            assert!(item.keys().all(|k| ["id", "href", "name", "rating"].contains(&k.as_str())));
        }
    }

    #[test]
    fn bottle_list_renders_collection_tiny_view() {
        let design = run_seeded(3);
        let registry = design.registry();
        let resource = registry.resource(registry.find_resource("bottle").unwrap());
        let response = &resource.actions["list"].responses["OK"];
        let collection = registry.media_type(response.resolved_media.unwrap());
        assert_eq!(collection.type_name, "BottleCollection");
        assert!(collection.view("tiny").is_some());
    }
}
