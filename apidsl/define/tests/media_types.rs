//! Default views, duplicates, links and collections.

use apidsl_define::prelude::*;
use apidsl_define::{DEFAULT_VIEW, LINK_VIEW};

fn with_default_view(design: &mut Design, identifier: &str) -> MediaTypeId {
    design.media_type(identifier.to_string(), |m| {
        m.attribute("name").of(Primitive::String);
        m.view("default", |v| v.attribute("name"));
    })
}

#[test]
fn attributes_without_default_view_fail() {
    for attribute_count in 1..4 {
        let mut design = Design::new();
        design.media_type("application/vnd.missing-default", move |m| {
            for i in 0..attribute_count {
                m.attribute(&format!("att{i}"));
            }
            m.view("tiny", |v| v.attribute("att0"));
        });
        let err = design.run().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.has_kind(ErrorKind::Structural));
        assert_eq!(
            err.errors()[0].context,
            "media type \"application/vnd.missing-default\""
        );
    }
}

#[test]
fn attributes_with_default_view_pass() {
    let mut design = Design::new();
    let id = with_default_view(&mut design, "application/vnd.ok+json");
    design.run().unwrap();

    let mt = design.registry().media_type(id);
    let view = mt.view(DEFAULT_VIEW).unwrap();
    assert_eq!(view.parent, id);
    assert_eq!(
        view.attributes().unwrap().keys().collect::<Vec<_>>(),
        vec!["name"]
    );
}

#[test]
fn duplicate_identifier_is_reported_without_aborting() {
    let mut design = Design::new();
    let first = with_default_view(&mut design, "application/vnd.dupe+json");
    let second = with_default_view(&mut design, "application/vnd.dupe");
    design.media_type("application/vnd.user", move |m| {
        m.attribute("dupe").of(second);
        m.view("default", |v| v.attribute("dupe"));
    });
    design.resource("dupe", move |r| {
        r.media(second);
        r.action("show", |a| {
            a.response("OK", 200).view("default");
        });
    });

    let err = design.run().unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has_kind(ErrorKind::Duplicate));
    let message = &err.errors()[0].message;
    assert!(message.contains(&format!("#{}", first.index())));
    assert!(message.contains(&format!("#{}", second.index())));

    let registry = design.registry();
    assert_eq!(registry.find_media_type("application/vnd.dupe"), Some(first));
    assert!(!registry.is_registered(second));
    assert_eq!(registry.media_type(second).identifier, "application/vnd.dupe");
    assert!(registry.media_type(second).view(DEFAULT_VIEW).is_some());
}

fn link_view_for(target_views: &'static [&'static str]) -> String {
    let mut design = Design::new();
    let owner = design.media_type("application/vnd.owner", move |m| {
        m.attribute("name").of(Primitive::String);
        for view in target_views {
            m.view(view, |v| v.attribute("name"));
        }
    });
    let bottle = design.media_type("application/vnd.bottle", move |m| {
        m.attribute("owner").of(owner);
        m.links(|l| l.link("owner"));
        m.view("default", |v| v.attribute("owner"));
    });
    design.run().unwrap();

    let link = &design.registry().media_type(bottle).links["owner"];
    assert_eq!(link.parent, bottle);
    assert_eq!(link.target, owner);
    link.view.clone()
}

#[test]
fn link_prefers_link_view() {
    assert_eq!(link_view_for(&["default", "link"]), LINK_VIEW);
}

#[test]
fn link_falls_back_to_default_view() {
    assert_eq!(link_view_for(&["default"]), DEFAULT_VIEW);
}

#[test]
fn explicit_link_view_is_used() {
    let mut design = Design::new();
    let owner = design.media_type("application/vnd.owner", |m| {
        m.attribute("name").of(Primitive::String);
        m.attribute("email").of(Primitive::String);
        m.view("default", |v| v.attribute("name"));
        m.view("link", |v| v.attribute("name"));
        m.view("l2v", |v| v.attribute("email"));
    });
    let bottle = design.media_type("application/vnd.bottle", move |m| {
        m.attribute("owner").of(owner);
        m.attribute("reviewer").of(owner);
        m.links(|l| {
            l.link("owner");
            l.link_with_view("reviewer", "l2v");
        });
        m.view("default", |v| {
            v.attribute("owner");
            v.attribute("reviewer");
        });
    });
    design.run().unwrap();

    let links = &design.registry().media_type(bottle).links;
    assert_eq!(links["owner"].view, LINK_VIEW);
    let reviewer = &links["reviewer"];
    assert_eq!(reviewer.view, "l2v");
    assert_eq!(reviewer.parent, bottle);
    assert_eq!(reviewer.target, owner);
}

#[test]
fn explicit_link_view_must_exist() {
    let mut design = Design::new();
    let owner = with_default_view(&mut design, "application/vnd.owner");
    design.media_type("application/vnd.bottle", move |m| {
        m.attribute("owner").of(owner);
        m.links(|l| l.link_with_view("owner", "tiny"));
        m.view("default", |v| v.attribute("owner"));
    });
    let err = design.run().unwrap_err();
    assert!(err.has_kind(ErrorKind::Resolution));
    assert!(err.to_string().contains("view \"tiny\" is not defined"));
}

#[test]
fn link_to_missing_or_non_media_attribute_fails() {
    let mut design = Design::new();
    design.media_type("application/vnd.bottle", |m| {
        m.attribute("name").of(Primitive::String);
        m.links(|l| {
            l.link("name");
            l.link("owner");
        });
        m.view("default", |v| v.attribute("name"));
    });
    let err = design.run().unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.errors().iter().all(|e| e.kind == ErrorKind::Resolution));
    assert_eq!(
        err.errors()[0].context,
        "link \"name\" of media type \"application/vnd.bottle\""
    );
}

#[test]
fn collection_by_handle_and_by_identifier_are_equivalent() {
    let mut by_handle = Design::new();
    let element = with_default_view(&mut by_handle, "application/vnd.example+json");
    let handle_collection = by_handle.collection_of(element);
    by_handle.run().unwrap();

    let mut by_name = Design::new();
    let name_collection = by_name.collection_of("application/vnd.example+json");
    let named_element = with_default_view(&mut by_name, "application/vnd.example+json");
    by_name.run().unwrap();

    let a = by_handle.registry().media_type(handle_collection);
    let b = by_name.registry().media_type(name_collection);
    assert_eq!(a.identifier, b.identifier);
    assert_eq!(a.identifier, "application/vnd.example+json; type=collection");
    assert_eq!(a.type_name, "ExampleCollection");
    assert_eq!(a.type_name, b.type_name);
    assert_eq!(a.element(), Some(element));
    assert_eq!(b.element(), Some(named_element));

    let element_identifier = &by_name.registry().media_type(b.element().unwrap()).identifier;
    assert_eq!(element_identifier, "application/vnd.example+json");
}

#[test]
fn collection_identifier_lookup_ignores_suffix() {
    let mut design = Design::new();
    let collection = design.collection_of("application/vnd.example");
    let element = with_default_view(&mut design, "application/vnd.example+json");
    design.run().unwrap();

    let registry = design.registry();
    assert_eq!(registry.media_type(collection).element(), Some(element));
    assert_eq!(
        registry.find_media_type("application/vnd.example; type=collection"),
        Some(collection)
    );
}

#[test]
fn collection_views_mirror_element_views() {
    let mut design = Design::new();
    let element = design.media_type("application/vnd.bottle", |m| {
        m.attribute("name");
        m.attribute("vintage").of(Primitive::Integer);
        m.view("default", |v| {
            v.attribute("name");
            v.attribute("vintage");
        });
        m.view("tiny", |v| v.attribute("name"));
    });
    let collection = design.collection_of(element);
    design.run().unwrap();

    let mt = design.registry().media_type(collection);
    assert!(mt.is_collection());
    assert_eq!(mt.views.keys().collect::<Vec<_>>(), vec!["default", "tiny"]);
    let item = &mt.view("tiny").unwrap().attribute.data_type.as_array().unwrap().element;
    assert_eq!(item.data_type.media_type(), Some(element));
    assert_eq!(item.view.as_deref(), Some("tiny"));
}

#[test]
fn collections_are_deduplicated_and_nest() {
    let mut design = Design::new();
    let element = with_default_view(&mut design, "application/vnd.cell");
    let row = design.collection_of(element);
    assert_eq!(design.collection_of(element), row);
    let grid = design.collection_of(row);
    design.run().unwrap();

    let registry = design.registry();
    assert_eq!(registry.media_type(grid).element(), Some(row));
    assert_eq!(registry.media_type(grid).type_name, "CellCollectionCollection");
}

#[test]
fn unresolved_collection_is_reported() {
    let mut design = Design::new();
    design.collection_of("application/vnd.nowhere");
    let err = design.run().unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has_kind(ErrorKind::Resolution));
}

#[test]
fn collection_declared_inside_a_body() {
    let mut design = Design::new();
    let tree = design.media_type("application/vnd.tree", |m| {
        let me = m.id();
        let children = m.collection_of(me);
        m.attribute("name");
        m.attribute("children").of(children);
        m.view("default", |v| {
            v.attribute("name");
            v.attribute("children");
        });
    });
    design.run().unwrap();

    let registry = design.registry();
    let children = registry
        .media_type(tree)
        .attribute_named("children")
        .unwrap()
        .data_type
        .media_type()
        .unwrap();
    assert_eq!(registry.media_type(children).type_name, "TreeCollection");
}
