//! Shared library fixtures for integration tests
#![allow(dead_code)]

use depot_config::LibrarySettings;
use depot_library::{
    Category, IncludeDirective, Library, LibraryDirective, Module, Resource, ResourceDirective,
    Scope, TypeDirective,
};

pub const ROOT: &str = "/virtual/lib";

pub fn settings() -> LibrarySettings {
    LibrarySettings::new(ROOT)
}

/// Plain resource producing a jar
pub fn jar(name: &str) -> ResourceDirective {
    ResourceDirective::resource(name).with_type(TypeDirective::new("jar"))
}

/// Two top-level modules, one local project and a few anonymous artifacts
///
/// ```text
/// acme 1.0        api; core -> api, ext/log; impl -> api, core, ext/util
/// ext 2.0         log; util 3.0 -> org/slf4j/slf4j-api
/// app (local)     -> acme/impl, test -> acme/api
/// ```
pub fn fixture_directive() -> LibraryDirective {
    LibraryDirective::new()
        .with_property("project.publisher", "Acme Corp")
        .with_resource(
            ResourceDirective::module("acme")
                .with_version("1.0")
                .with_info("Acme", Some("Acme components".to_string()))
                .with_resource(jar("api"))
                .with_resource(
                    jar("core")
                        .with_include(
                            Scope::Build,
                            IncludeDirective::uri("artifact:jar:org/tools/codegen#2.0"),
                        )
                        .with_include(
                            Scope::Runtime,
                            IncludeDirective::key("api").with_category(Category::Public),
                        )
                        .with_include(
                            Scope::Runtime,
                            IncludeDirective::reference("ext/log").with_category(Category::Private),
                        )
                        .with_include(
                            Scope::Test,
                            IncludeDirective::uri("artifact:jar:org/junit/junit#4.12"),
                        ),
                )
                .with_resource(
                    jar("impl")
                        .with_include(
                            Scope::Runtime,
                            IncludeDirective::key("api").with_category(Category::Public),
                        )
                        .with_include(
                            Scope::Runtime,
                            IncludeDirective::key("core").with_category(Category::Protected),
                        )
                        .with_include(
                            Scope::Runtime,
                            IncludeDirective::reference("ext/util")
                                .with_category(Category::Private),
                        ),
                ),
        )
        .with_resource(
            ResourceDirective::module("ext")
                .with_version("2.0")
                .with_resource(jar("log"))
                .with_resource(
                    jar("util").with_version("3.0").with_include(
                        Scope::Runtime,
                        IncludeDirective::uri("artifact:jar:org/slf4j/slf4j-api#1.7")
                            .with_category(Category::Public),
                    ),
                ),
        )
        .with_resource(
            ResourceDirective::project("app", "app")
                .with_type(TypeDirective::new("jar"))
                .with_type(TypeDirective::new("jar").with_name("app-tests").test())
                .with_include(
                    Scope::Runtime,
                    IncludeDirective::reference("acme/impl").with_category(Category::Public),
                )
                .with_include(Scope::Test, IncludeDirective::reference("acme/api")),
        )
}

pub fn fixture() -> Library {
    Library::new(&fixture_directive(), settings()).unwrap()
}

/// Nested modules whose resources depend across sibling modules
///
/// ```text
/// platform/base   lib
/// platform/net    http -> platform/base/lib
/// platform/web    server -> platform/net/http
/// ```
pub fn nested_directive() -> LibraryDirective {
    LibraryDirective::new().with_resource(
        ResourceDirective::module("platform")
            .with_resource(ResourceDirective::module("base").with_resource(jar("lib")))
            .with_resource(
                ResourceDirective::module("net").with_resource(
                    jar("http").with_include(
                        Scope::Runtime,
                        IncludeDirective::reference("platform/base/lib"),
                    ),
                ),
            )
            .with_resource(
                ResourceDirective::module("web").with_resource(
                    jar("server").with_include(
                        Scope::Runtime,
                        IncludeDirective::reference("platform/net/http"),
                    ),
                ),
            ),
    )
}

pub fn nested() -> Library {
    Library::new(&nested_directive(), settings()).unwrap()
}

pub fn module_paths(modules: &[Module<'_>]) -> Vec<String> {
    modules.iter().map(|m| m.path().to_string()).collect()
}

pub fn resource_paths(resources: &[Resource<'_>]) -> Vec<String> {
    resources.iter().map(|r| r.path().to_string()).collect()
}

/// Index of `path` within a sorted selection
pub fn position(resources: &[Resource<'_>], path: &str) -> usize {
    resources
        .iter()
        .position(|r| r.path().to_string() == path)
        .unwrap_or_else(|| panic!("{} missing from {:?}", path, resource_paths(resources)))
}
