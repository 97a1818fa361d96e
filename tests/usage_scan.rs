mod common;

use common::Project;
use laridx::model::UsageKind;
use laridx::query::ArtifactQuery;

const ROUTES: &str = r#"<?php
Route::get('/profile', 'ProfileController@edit')->name('profile.edit');
Route::get('/reports', 'ReportController@index');
"#;

const CONTROLLER: &str = r#"<?php

namespace App\Http\Controllers;

class ProfileController extends Controller
{
    public function update()
    {
        session()->flash('status', __('messages.saved'));
        return redirect()->route('profile.edit');
    }

    public function show()
    {
        return view('profile.show', ['reports' => url('/reports')]);
    }
}
"#;

const TEMPLATE: &str = r#"@extends('layouts.app')

@section('content')
    <a href="{{ route('profile.edit') }}">@lang('messages.saved')</a>
    <link rel="stylesheet" href="{{ asset('css/profile.css') }}">
@endsection
"#;

const SCRIPT: &str = r#"import { router } from '@inertiajs/vue3'

export function openProfile() {
    router.visit('/profile')
}
"#;

fn project() -> Project {
    let project = Project::new();
    project
        .write("routes/web.php", ROUTES)
        .write("app/Http/Controllers/ProfileController.php", CONTROLLER)
        .write("resources/views/profile/show.blade.php", TEMPLATE)
        .write("resources/views/layouts/app.blade.php", "<html>@yield('content')</html>")
        .write("resources/lang/en/messages.php", "<?php return ['saved' => 'Saved.'];")
        .write("public/css/profile.css", "")
        .write("resources/js/profile.js", SCRIPT);
    project
}

#[test]
fn route_usages_across_file_kinds() {
    let index = project().index();
    let usages = index.routes().usages("profile.edit");
    let files: Vec<(&str, usize, UsageKind)> = usages
        .iter()
        .map(|u| (u.file.as_str(), u.line_number, u.usage_kind))
        .collect();
    assert_eq!(
        files,
        vec![
            ("app/Http/Controllers/ProfileController.php", 9, UsageKind::NameReference),
            ("resources/js/profile.js", 3, UsageKind::PathReference),
            ("resources/views/profile/show.blade.php", 3, UsageKind::NameReference),
        ]
    );
}

#[test]
fn url_helper_references_unnamed_routes() {
    let index = project().index();
    let usages = index.routes().usages("/reports");
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].usage_kind, UsageKind::UrlReference);
    assert_eq!(usages[0].line_number, 14);
}

#[test]
fn translation_view_and_asset_usages() {
    let index = project().index();

    let translations = index.translations().usages("messages.saved");
    let lines: Vec<(&str, usize)> = translations
        .iter()
        .map(|u| (u.file.as_str(), u.line_number))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("app/Http/Controllers/ProfileController.php", 8),
            ("resources/views/profile/show.blade.php", 3),
        ]
    );

    let views = index.views().usages("layouts.app");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].file, "resources/views/profile/show.blade.php");
    assert_eq!(views[0].line_number, 0);
    assert_eq!(index.views().usages("profile/show").len(), 1);

    let assets = index.assets().usages("css/profile.css");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].usage_kind, UsageKind::PathReference);
}

#[test]
fn declaration_literals_are_not_usages() {
    let index = project().index();
    assert!(
        index
            .routes()
            .usages("profile.edit")
            .iter()
            .all(|u| u.file != "routes/web.php")
    );
    assert!(
        index
            .translations()
            .usages("messages.saved")
            .iter()
            .all(|u| !u.file.starts_with("resources/lang"))
    );
}

#[test]
fn route_view_templates_are_view_usages() {
    let project = Project::new();
    project
        .write(
            "routes/web.php",
            "<?php\nRoute::view('/welcome', 'welcome')->name('welcome');\n",
        )
        .write("resources/views/welcome.blade.php", "<h1>hi</h1>");
    let index = project.index();

    let views = index.views().usages("welcome");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].file, "routes/web.php");
    assert_eq!(views[0].line_number, 1);

    // the name argument stays part of the route declaration
    assert!(index.routes().usages("welcome").is_empty());
    assert_eq!(index.route("welcome").unwrap().path, "/welcome");
}
