//! Glob selection, basedir queries and dependency sorting

mod common;

use common::*;
use depot_library::{
    IncludeDirective, Library, LibraryDirective, LibraryError, ResourceDirective, Scope,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;
use std::path::Path;

#[rstest]
#[case("acme/*", vec!["acme/api", "acme/core", "acme/impl"])]
#[case("*", vec!["acme", "app", "ext"])]
#[case("*/c*", vec!["acme/core"])]
#[case("a*/i*", vec!["acme/impl"])]
#[case("ext/u*l", vec!["ext/util"])]
#[case("*/missing", vec![])]
#[case("app/*", vec![])]
#[case("acme/", vec!["acme"])]
fn test_glob_selection(#[case] criteria: &str, #[case] expected: Vec<&str>) {
    let library = fixture();
    let selection = library.select(criteria, false).unwrap();
    assert_eq!(resource_paths(&selection), expected);
}

#[test]
fn test_child_glob_returns_exactly_matching_children() {
    let directive = LibraryDirective::new()
        .with_resource(
            ResourceDirective::module("a")
                .with_resource(jar("x"))
                .with_resource(jar("y")),
        )
        .with_resource(ResourceDirective::module("b").with_resource(jar("z")));
    let library = Library::new(&directive, settings()).unwrap();

    let selection = library.select("a/*", false).unwrap();
    assert_eq!(resource_paths(&selection), vec!["a/x", "a/y"]);
}

#[test]
fn test_deep_wildcard_selects_everything_once() {
    let library = fixture();
    let selection = library.select("**/*", false).unwrap();
    assert_eq!(
        resource_paths(&selection),
        vec![
            "acme",
            "acme/api",
            "acme/core",
            "acme/impl",
            "app",
            "ext",
            "ext/log",
            "ext/util"
        ]
    );
}

#[test]
fn test_deep_wildcard_under_nested_modules() {
    let library = nested();
    let selection = library.select("**/h*", false).unwrap();
    assert_eq!(resource_paths(&selection), vec!["platform/net/http"]);

    let platform = library.module("platform").unwrap();
    let selection = platform.select("**/*", false, false).unwrap();
    assert_eq!(
        resource_paths(&selection),
        vec![
            "platform",
            "platform/base",
            "platform/base/lib",
            "platform/net",
            "platform/net/http",
            "platform/web",
            "platform/web/server"
        ]
    );
}

#[test]
fn test_double_star_returns_each_module_after_its_providers() {
    let library = nested();
    let selection = library.select("**", true).unwrap();
    let paths = resource_paths(&selection);

    assert_eq!(paths.len(), 4);
    assert_eq!(paths.iter().collect::<HashSet<_>>().len(), 4);
    assert!(position(&selection, "platform/base") < position(&selection, "platform/net"));
    assert!(position(&selection, "platform/net") < position(&selection, "platform/web"));
    assert!(position(&selection, "platform/web") < position(&selection, "platform"));
}

#[test]
fn test_all_modules_sorted() {
    let library = fixture();
    assert_eq!(module_paths(&library.all_modules().unwrap()), vec!["ext", "acme"]);
    assert_eq!(module_paths(&library.modules()), vec!["acme", "ext"]);

    let nested = nested();
    let platform = nested.module("platform").unwrap();
    assert_eq!(
        module_paths(&platform.all_modules().unwrap()),
        vec!["platform/base", "platform/net", "platform/web"]
    );
}

#[test]
fn test_local_selection() {
    let library = fixture();
    let selection = library.select_local("**/*", true, false).unwrap();
    assert_eq!(resource_paths(&selection), vec!["app"]);
    assert_eq!(
        selection[0].basedir(),
        Some(Path::new("/virtual/lib/app"))
    );
}

#[test]
fn test_select_basedir() {
    let directive = LibraryDirective::new().with_resource(
        ResourceDirective::module("acme")
            .with_basedir("acme")
            .with_classifier(depot_library::Classifier::Local)
            .with_resource(ResourceDirective::project("core", "core"))
            .with_resource(
                ResourceDirective::project("impl", "impl")
                    .with_include(Scope::Runtime, IncludeDirective::key("core")),
            ),
    );
    let library = Library::new(&directive, settings()).unwrap();
    let base = Path::new(ROOT).join("acme");

    let below = library.select_basedir(&base, false).unwrap();
    assert_eq!(resource_paths(&below), vec!["acme/core", "acme/impl"]);

    let inclusive = library.select_basedir(&base, true).unwrap();
    assert_eq!(inclusive.len(), 3);
    assert!(position(&inclusive, "acme/core") < position(&inclusive, "acme/impl"));

    let located = library.locate(&base.join("impl")).unwrap();
    assert_eq!(located.path().to_string(), "acme/impl");
    assert!(located.is_local());
}

#[test]
fn test_locate_missing_basedir() {
    let library = fixture();
    let error = library.locate(Path::new("/virtual/lib/nowhere")).unwrap_err();
    assert!(matches!(error, LibraryError::ResourceNotFound { .. }));
    assert!(library.locate(Path::new("/virtual/lib/./app")).is_ok());
}

#[test]
fn test_sort_places_providers_first() {
    let library = fixture();
    let everything = library.select("**/*", false).unwrap();
    let sorted = library.sort_strict(&everything).unwrap();
    assert_eq!(sorted.len(), everything.len());

    for consumer in &sorted {
        for provider in consumer.aggregated_providers(Scope::Test, false, false).unwrap() {
            if sorted.contains(&provider) {
                assert!(
                    position(&sorted, &provider.path().to_string())
                        < position(&sorted, &consumer.path().to_string()),
                    "{} should precede {}",
                    provider,
                    consumer
                );
            }
        }
    }
}

#[test]
fn test_sorted_selection() {
    let library = fixture();
    let selection = library.select("acme/*", true).unwrap();
    assert_eq!(resource_paths(&selection), vec!["acme/api", "acme/core", "acme/impl"]);
}

fn cyclic() -> Library {
    let directive = LibraryDirective::new().with_resource(
        ResourceDirective::module("loop")
            .with_resource(jar("a").with_include(Scope::Runtime, IncludeDirective::key("b")))
            .with_resource(jar("b").with_include(Scope::Runtime, IncludeDirective::key("a"))),
    );
    Library::new(&directive, settings()).unwrap()
}

#[test]
fn test_lenient_sort_breaks_cycles() {
    let library = cyclic();
    let members = library.select("loop/*", false).unwrap();
    let sorted = library.sort(&members).unwrap();
    assert_eq!(resource_paths(&sorted), vec!["loop/b", "loop/a"]);
}

#[test]
fn test_strict_sort_reports_cycles() {
    let library = cyclic();
    let members = library.select("loop/*", false).unwrap();
    match library.sort_strict(&members) {
        Err(LibraryError::CircularDependency(cycle)) => {
            assert_eq!(cycle, "loop/a -> loop/b -> loop/a");
        }
        other => panic!("expected a circular dependency, got {:?}", other),
    }
}

#[test]
fn test_expanding_cyclic_providers_terminates() {
    let library = cyclic();
    let a = library.resource("loop/a").unwrap();
    let providers = a.providers(Scope::Runtime, true, false).unwrap();
    assert_eq!(resource_paths(&providers), vec!["loop/a", "loop/b"]);
}

fn enclosing() -> Library {
    let directive = LibraryDirective::new().with_resource(
        ResourceDirective::module("acme")
            .with_resource(jar("core"))
            .with_resource(
                ResourceDirective::module("tools").with_resource(
                    jar("cli")
                        .with_include(Scope::Runtime, IncludeDirective::reference("acme/core")),
                ),
            ),
    );
    Library::new(&directive, settings()).unwrap()
}

#[test]
fn test_submodule_using_enclosing_module_sorts_strictly() {
    let library = enclosing();
    let everything = library.select("**/*", false).unwrap();
    let sorted = library.sort_strict(&everything).unwrap();
    assert_eq!(
        resource_paths(&sorted),
        vec!["acme/core", "acme/tools/cli", "acme/tools", "acme"]
    );

    let modules = library.select("**", true).unwrap();
    assert_eq!(resource_paths(&modules), vec!["acme/tools", "acme"]);

    let tools = library.module("acme/tools").unwrap();
    assert!(tools.providers(Scope::Build, false, false).unwrap().is_empty());
}
