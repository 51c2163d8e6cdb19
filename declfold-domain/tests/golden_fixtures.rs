//! Golden tests: the Flutter/Firebase stock-manager Android build, expressed as declarations.
//!
//! The resolved plan is compared field by field against the expected layout. A minimal
//! `root`/`app` binding pair with one `fb` platform is checked as well.

use camino::Utf8PathBuf;
use declfold_domain::{Resolver, ResolverConfig};
use declfold_types::decl::{
    Declaration, DependencyCoordinate, DependencyScope, OptionValue, PathExpr, PluginDeclaration,
};
use declfold_types::plan::VersionSource;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn flutter_properties() -> BTreeMap<String, String> {
    [
        ("flutter.compileSdkVersion", "35"),
        ("flutter.minSdkVersion", "21"),
        ("flutter.targetSdkVersion", "35"),
        ("flutter.versionCode", "1"),
        ("flutter.versionName", "1.0.0"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn stock_manager_declarations() -> Vec<Declaration> {
    let firebase = "com.google.firebase";
    vec![
        Declaration::Repository {
            name: "google".to_string(),
        },
        Declaration::Repository {
            name: "mavenCentral".to_string(),
        },
        Declaration::dependency(
            DependencyCoordinate::new("com.google.gms", "google-services", Some("4.3.15"))
                .with_scope(DependencyScope::Classpath),
        ),
        Declaration::directory("root", PathExpr::literal("../../build")),
        Declaration::directory("app", PathExpr::derive("root")),
        Declaration::Clean {
            binding: "root".to_string(),
        },
        Declaration::plugin("com.android.application"),
        Declaration::plugin("kotlin-android"),
        Declaration::Plugin(
            PluginDeclaration::new("dev.flutter.flutter-gradle-plugin")
                .after(["com.android.application", "kotlin-android"]),
        ),
        Declaration::plugin("com.google.gms.google-services"),
        Declaration::SetOption {
            key: "namespace".to_string(),
            value: OptionValue::literal("com.exemple.stockmanager"),
        },
        Declaration::SetOption {
            key: "compileSdk".to_string(),
            value: OptionValue::property("flutter.compileSdkVersion"),
        },
        Declaration::SetOption {
            key: "ndkVersion".to_string(),
            value: OptionValue::literal("27.0.12077973"),
        },
        Declaration::SetOption {
            key: "sourceCompatibility".to_string(),
            value: OptionValue::literal("11"),
        },
        Declaration::SetOption {
            key: "targetCompatibility".to_string(),
            value: OptionValue::literal("11"),
        },
        Declaration::SetOption {
            key: "jvmTarget".to_string(),
            value: OptionValue::literal("11"),
        },
        Declaration::SetOption {
            key: "minSdk".to_string(),
            value: OptionValue::property("flutter.minSdkVersion"),
        },
        Declaration::SetOption {
            key: "flutterSource".to_string(),
            value: OptionValue::literal("../.."),
        },
        Declaration::Variant {
            name: "release".to_string(),
            signing: None,
        },
        Declaration::dependency(DependencyCoordinate::new(firebase, "firebase-database-ktx", None)),
        Declaration::dependency(DependencyCoordinate::new(firebase, "firebase-auth-ktx", None)),
        Declaration::dependency(DependencyCoordinate::platform(firebase, "firebase-bom", "30.0.1")),
    ]
}

#[test]
fn stock_manager_build_resolves() {
    let config = ResolverConfig {
        base_dir: None,
        properties: flutter_properties(),
    };
    let plan = Resolver::resolve_all(config, stock_manager_declarations()).expect("resolve");

    assert_eq!(
        plan.plugins,
        vec![
            "com.android.application",
            "kotlin-android",
            "dev.flutter.flutter-gradle-plugin",
            "com.google.gms.google-services",
        ]
    );
    assert_eq!(plan.repositories, vec!["google", "mavenCentral"]);

    assert_eq!(plan.directory("root"), Some(&Utf8PathBuf::from("../../build")));
    assert_eq!(plan.directory("app"), Some(&Utf8PathBuf::from("../../build/app")));
    assert_eq!(plan.clean, vec![Utf8PathBuf::from("../../build")]);

    let deps: Vec<String> = plan.dependencies.iter().map(ToString::to_string).collect();
    assert_eq!(
        deps,
        vec![
            "com.google.gms:google-services:4.3.15",
            "com.google.firebase:firebase-database-ktx:30.0.1",
            "com.google.firebase:firebase-auth-ktx:30.0.1",
        ]
    );
    assert_eq!(plan.dependencies[0].scope, DependencyScope::Classpath);
    assert_eq!(plan.dependencies[0].version_source, VersionSource::Declared);
    assert_eq!(plan.dependencies[1].version_source, VersionSource::Platform);
    assert_eq!(plan.constraints.len(), 1);
    assert_eq!(plan.constraints[0].artifact, "firebase-bom");

    assert_eq!(plan.options["compileSdk"], "35");
    assert_eq!(plan.options["minSdk"], "21");
    assert_eq!(plan.options["flutterSource"], "../..");
    assert_eq!(plan.options["namespace"], "com.exemple.stockmanager");

    let release = plan.variant("release").expect("release variant");
    assert_eq!(release.signing, "debug");
    assert!(release.signing_defaulted);

    assert_eq!(plan.summary.plugins, 4);
    assert_eq!(plan.summary.dependencies, 3);
    assert_eq!(plan.summary.constrained, 2);
}

#[test]
fn minimal_binding_and_platform_resolve() {
    let decls = vec![
        Declaration::directory("root", PathExpr::literal("../../build")),
        Declaration::directory("app", PathExpr::derive("root")),
        Declaration::dependency(DependencyCoordinate::platform("fb", "fb-bom", "30.0.1")),
        Declaration::dependency(DependencyCoordinate::new("fb", "database", None)),
    ];
    let plan = Resolver::resolve_all(ResolverConfig::default(), decls).expect("resolve");

    assert_eq!(plan.directory("app"), Some(&Utf8PathBuf::from("../../build/app")));
    assert_eq!(plan.dependencies.len(), 1);
    assert_eq!(plan.dependencies[0].to_string(), "fb:database:30.0.1");
}

#[test]
fn plan_json_is_stable_across_runs() {
    let config = || ResolverConfig {
        base_dir: Some(Utf8PathBuf::from("android/build")),
        properties: flutter_properties(),
    };
    let a = Resolver::resolve_all(config(), stock_manager_declarations()).expect("resolve");
    let b = Resolver::resolve_all(config(), stock_manager_declarations()).expect("resolve");

    let ja = serde_json::to_string_pretty(&a).expect("serialize");
    let jb = serde_json::to_string_pretty(&b).expect("serialize");
    assert_eq!(ja, jb);
    assert_eq!(a.directory("app"), Some(&Utf8PathBuf::from("build/app")));
}
