mod common;

use common::Project;
use laridx::model::{ArtifactKind, MiddlewareSource, ParamType};
use laridx::query::ArtifactQuery;

const WEB: &str = r#"<?php

use App\Http\Controllers\PostController;
use Illuminate\Support\Facades\Route;

Route::get('/', fn () => view('welcome'))->name('home');

Route::middleware(['web', 'auth'])->prefix('admin')->name('admin.')->group(function () {
    Route::get('/posts/{post}', [PostController::class, 'show'])->name('posts.show')->whereNumber('post');
    Route::resource('tags', TagController::class)->except(['create', 'edit']);
});
"#;

const API: &str = r#"<?php
Route::group(['prefix' => 'api/v1', 'as' => 'api.', 'middleware' => 'throttle:60,1'], function () {
    Route::get('users/{user?}', 'Api\UserController@show')->name('users.show');
});
"#;

#[test]
fn routes_from_every_route_file() {
    let project = Project::new();
    project.write("routes/web.php", WEB).write("routes/api.php", API);
    let index = project.index();

    let names = index.routes().all();
    assert!(names.contains(&"home".to_string()));
    assert!(names.contains(&"admin.posts.show".to_string()));
    assert!(names.contains(&"admin.tags.index".to_string()));
    assert!(!names.contains(&"admin.tags.create".to_string()));
    assert!(names.contains(&"api.users.show".to_string()));
    assert!(names.contains(&"/admin/posts/{post}".to_string()));

    let stats = index.stats();
    // home, posts.show, five tag actions, api.users.show
    assert_eq!(stats.routes, 8);
    assert_eq!(stats.route_names, 8);
    assert_eq!(stats.errors, 0);
}

#[test]
fn group_attributes_flow_into_routes() {
    let project = Project::new();
    project.write("routes/web.php", WEB).write("routes/api.php", API);
    let index = project.index();

    let post = index.route("admin.posts.show").unwrap();
    assert_eq!(post.path, "/admin/posts/{post}");
    assert_eq!(post.method, "GET");
    assert_eq!(post.middleware, vec!["web", "auth"]);
    assert_eq!(post.controller.as_deref(), Some("PostController@show"));
    assert_eq!(post.parameters[0].inferred_type, ParamType::Integer);

    let api = index.route("/api/v1/users/{user?}").unwrap();
    assert_eq!(api.name.as_deref(), Some("api.users.show"));
    assert!(api.parameters[0].optional);
    assert_eq!(api.middleware, vec!["throttle:60,1"]);
}

#[test]
fn route_definitions_split_actions_and_middleware() {
    let project = Project::new();
    project.write("routes/web.php", WEB);
    let index = project.index();

    let definition = index.route_definition("admin.posts.show").unwrap();
    assert_eq!(definition.uri, "/admin/posts/{post}");
    assert_eq!(definition.action.controller.as_deref(), Some("PostController"));
    assert_eq!(definition.action.method.as_deref(), Some("show"));
    assert!(!definition.action.is_closure);
    assert!(
        definition
            .middleware
            .iter()
            .all(|m| m.source == MiddlewareSource::Group)
    );
    assert_eq!(definition.prefix, "admin");

    let home = index.route_definition("home").unwrap();
    assert!(home.action.is_closure);
}

#[test]
fn declarations_point_at_the_route_call() {
    let project = Project::new();
    project.write("routes/web.php", WEB);
    let index = project.index();

    let sites = index.routes().declarations("home");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].file, "routes/web.php");
    assert_eq!(sites[0].line, 5);
    assert!(index.routes().declarations("nope").is_empty());
    assert!(index.routes().usages("nope").is_empty());
}

#[test]
fn module_route_files_are_scanned() {
    let project = Project::new();
    project.write(
        "Modules/Billing/routes/web.php",
        "<?php Route::get('/invoices', 'InvoiceController@index')->name('billing.invoices');",
    );
    let index = project.index();
    assert!(index.routes().is_known("billing.invoices"));
    assert_eq!(
        index.query(ArtifactKind::Route).declarations("billing.invoices")[0].file,
        "Modules/Billing/routes/web.php"
    );
}

#[test]
fn refresh_replaces_the_previous_generation() {
    let project = Project::new();
    project.write("routes/web.php", "<?php Route::get('/a', 'A@a')->name('a');");
    let index = project.index();
    assert!(index.route("a").is_some());

    project.write("routes/web.php", "<?php Route::get('/b', 'B@b')->name('b');");
    index.refresh().unwrap();
    assert!(index.route("a").is_none());
    assert!(index.route("b").is_some());
}

#[test]
fn optional_parameter_paths_resolve() {
    let project = Project::new();
    project.write("routes/api.php", API).write(
        "app/Http/Controllers/Api/Links.php",
        "<?php\nclass Links {\n    public function go() { return redirect(route('/api/v1/users/{user?}')); }\n    public function to() { return url('/api/v1/users/{user?}?tab=posts'); }\n}\n",
    );
    let index = project.index();

    let routes = index.routes();
    assert!(routes.is_known("/api/v1/users/{user?}"));
    assert_eq!(routes.declarations("/api/v1/users/{user?}").len(), 1);
    assert!(index.route_definition("/api/v1/users/{user?}").is_some());

    let usages = routes.usages("api.users.show");
    assert_eq!(usages.len(), 2);
    assert_eq!(usages[0].line_number, 2);
    assert_eq!(usages[1].line_number, 3);
}

#[test]
fn resource_actions_have_distinct_declarations() {
    let project = Project::new();
    project.write("routes/web.php", WEB);
    let index = project.index();

    let routes = index.routes();
    let actions = ["index", "store", "show", "update", "destroy"];
    let mut sites = Vec::new();
    for action in actions {
        let found = routes.declarations(&format!("admin.tags.{action}"));
        assert_eq!(found.len(), 1, "{action}");
        assert_eq!(found[0].line, 9);
        assert_eq!(found[0].expansion.as_deref(), Some(action));
        sites.push(found[0].clone());
    }
    sites.sort();
    sites.dedup();
    assert_eq!(sites.len(), actions.len());
    assert_eq!(routes.declarations("home")[0].expansion, None);
}
