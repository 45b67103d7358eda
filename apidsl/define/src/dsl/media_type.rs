use super::Scope;
use super::attribute::{AttributeDsl, AttributesDsl, extend_required, member};
use crate::error::{DslError, ErrorCollector};
use crate::media_type::{MediaTypeDefinition, PendingLink, PendingView};
use crate::types::{MediaRef, MediaTypeId};

/// Body context of a media type declaration.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{Design, Primitive};
///
/// let mut design = Design::new();
/// let winery = design.media_type("application/vnd.winery+json", |m| {
///     m.attribute("name").of(Primitive::String);
///     m.view("default", |v| v.attribute("name"));
///     m.view("link", |v| v.attribute("name"));
/// });
/// let bottle = design.media_type("application/vnd.bottle+json", move |m| {
///     m.attribute("name").of(Primitive::String);
///     m.attribute("winery").of(winery);
///     m.links(|l| l.link("winery"));
///     m.view("default", |v| {
///         v.attribute("name");
///         v.attribute("winery");
///     });
/// });
/// design.run().unwrap();
///
/// let link = &design.registry().media_type(bottle).links["winery"];
/// assert_eq!(link.view, "link");
/// assert_eq!(link.target, winery);
/// ```
pub struct MediaTypeDsl<'a> {
    def: &'a mut MediaTypeDefinition,
    scope: Scope<'a>,
}

impl<'a> MediaTypeDsl<'a> {
    pub(crate) fn new(def: &'a mut MediaTypeDefinition, scope: Scope<'a>) -> Self {
        Self { def, scope }
    }

    /// Handle of the media type being declared.
    pub fn id(&self) -> MediaTypeId {
        self.def.id
    }

    pub fn identifier(&self) -> &str {
        &self.def.identifier
    }

    pub fn description(&mut self, description: impl Into<String>) {
        self.def.description = Some(description.into());
    }

    /// Overrides the type name derived from the identifier.
    pub fn type_name(&mut self, name: impl Into<String>) {
        self.def.type_name = name.into();
    }

    pub fn content_type(&mut self, content_type: impl Into<String>) {
        self.def.content_type = Some(content_type.into());
    }

    /// Marks the media type as describing error responses.
    pub fn error_media(&mut self) {
        self.def.is_error = true;
    }

    /// Attributes declared without a type inherit from the same-named
    /// attribute of `media`.
    pub fn reference(&mut self, media: impl Into<MediaRef>) {
        self.def.reference = Some(media.into());
    }

    pub fn attributes(&mut self, body: impl FnOnce(&mut AttributesDsl<'_>)) {
        let context = self.def.context();
        let mut attributes =
            AttributesDsl::new(&mut self.def.attribute, self.scope.reborrow(), context);
        body(&mut attributes);
    }

    pub fn attribute(&mut self, name: &str) -> AttributeDsl<'_> {
        let context = self.def.context();
        member(&mut self.def.attribute, self.scope.reborrow(), &context, name)
    }

    pub fn required<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_required(&mut self.def.attribute, names);
    }

    /// Declares a view. Attribute names are checked once every body ran.
    pub fn view(&mut self, name: &str, body: impl FnOnce(&mut ViewDsl<'_>)) {
        if self.def.pending_views.iter().any(|v| v.name == name) {
            self.scope.errors.push(DslError::duplicate(
                format!("view {name:?} of {}", self.def.context()),
                "view is defined twice",
            ));
            return;
        }
        let mut pending = PendingView {
            name: name.to_string(),
            attributes: Vec::new(),
        };
        body(&mut ViewDsl {
            view: &mut pending,
        });
        self.def.pending_views.push(pending);
    }

    /// Declares links. Each link names an attribute of this media type whose
    /// type is another media type.
    pub fn links(&mut self, body: impl FnOnce(&mut LinksDsl<'_>)) {
        let context = self.def.context();
        body(&mut LinksDsl {
            links: &mut self.def.pending_links,
            errors: &mut *self.scope.errors,
            context: &context,
        });
    }

    /// Collection wrapping `element`, usable as an attribute type.
    pub fn collection_of(&mut self, element: impl Into<MediaRef>) -> MediaTypeId {
        self.scope.collection_of(element.into())
    }

    /// Finds a declared media type by identifier.
    pub fn lookup(&self, identifier: &str) -> Option<MediaTypeId> {
        self.scope.registry.find_media_type(identifier)
    }
}

/// Body context of a view declaration.
pub struct ViewDsl<'a> {
    view: &'a mut PendingView,
}

impl ViewDsl<'_> {
    /// Projects the parent attribute `name` into the view.
    pub fn attribute(&mut self, name: &str) {
        self.push(name, None);
    }

    /// Projects a media type attribute rendered with its own `view`.
    pub fn attribute_with_view(&mut self, name: &str, view: &str) {
        self.push(name, Some(view.to_string()));
    }

    fn push(&mut self, name: &str, view: Option<String>) {
        match self.view.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = view,
            None => self.view.attributes.push((name.to_string(), view)),
        }
    }
}

/// Body context of a links declaration.
pub struct LinksDsl<'a> {
    links: &'a mut Vec<PendingLink>,
    errors: &'a mut ErrorCollector,
    context: &'a str,
}

impl LinksDsl<'_> {
    /// Links the attribute `name`, rendered with the target's `link` view when
    /// it has one and its `default` view otherwise.
    pub fn link(&mut self, name: &str) {
        self.push(name, None);
    }

    pub fn link_with_view(&mut self, name: &str, view: &str) {
        self.push(name, Some(view.to_string()));
    }

    fn push(&mut self, name: &str, view: Option<String>) {
        if self.links.iter().any(|l| l.name == name) {
            self.errors.push(DslError::duplicate(
                format!("link {name:?} of {}", self.context),
                "link is defined twice",
            ));
            return;
        }
        self.links.push(PendingLink {
            name: name.to_string(),
            view,
        });
    }
}
