mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::Value;

use common::*;
use dinehub::handlers::routes;
use dinehub::models::user_model::Role;
use dinehub::store::Store;

#[actix_web::test]
async fn plain_users_are_turned_away_from_admin_pages() {
    let h = food_harness(ScriptedGateway::default());
    seed_user(&h.store, "root", Role::SuperAdmin).await;
    seed_user(&h.store, "bob", Role::User).await;
    let app = test::init_service(App::new().app_data(h.state.clone()).configure(routes)).await;
    let bob = session(&test::call_service(&app, login_request("bob@x.com", "p1").to_request()).await);

    for uri in ["/admin/dashboard", "/customers", "/add_product"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri(uri).cookie(bob.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), "/");
        assert_eq!(flash_message(&resp), "Access denied. Admins only.");
    }
}

#[actix_web::test]
async fn admin_manages_products() {
    let h = food_harness(ScriptedGateway::default());
    seed_user(&h.store, "root", Role::SuperAdmin).await;
    seed_user(&h.store, "ada", Role::Admin).await;
    let app = test::init_service(App::new().app_data(h.state.clone()).configure(routes)).await;
    let ada = session(&test::call_service(&app, login_request("ada@x.com", "p1").to_request()).await);

    let add = |price: &'static str| {
        test::TestRequest::post()
            .uri("/add_product")
            .cookie(ada.clone())
            .set_form([
                ("category", "Pizza"),
                ("name", "Margherita"),
                ("image_url", "https://img.test/m.jpg"),
                ("price", price),
            ])
            .to_request()
    };

    let resp = test::call_service(&app, add("-3")).await;
    assert_eq!(location(&resp), "/add_product");
    assert!(h.store.list_products(None).await.unwrap().is_empty());

    let resp = test::call_service(&app, add("9.5")).await;
    assert_eq!(location(&resp), "/admin/dashboard");
    assert_eq!(flash_message(&resp), "Product added successfully!");
    let product = h.store.list_products(None).await.unwrap().remove(0);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/categories?category=Pizza")
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["pizza"][0]["name"], "Margherita");
    assert_eq!(page["burger"].as_array().unwrap().len(), 0);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/delete_product/Taco/{}", product.id))
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/delete_product/Pizza/{}", product.id))
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(flash_message(&resp), "Pizza 'Margherita' deleted successfully!");
    assert!(h.store.list_products(None).await.unwrap().is_empty());
}

#[actix_web::test]
async fn only_the_super_admin_changes_roles_and_deletes() {
    let h = food_harness(ScriptedGateway::default());
    seed_user(&h.store, "root", Role::SuperAdmin).await;
    let ada_id = seed_user(&h.store, "ada", Role::Admin).await;
    let bob_id = seed_user(&h.store, "bob", Role::User).await;
    let app = test::init_service(App::new().app_data(h.state.clone()).configure(routes)).await;
    let root = session(&test::call_service(&app, login_request("root@x.com", "p1").to_request()).await);
    let ada = session(&test::call_service(&app, login_request("ada@x.com", "p1").to_request()).await);

    let post = |uri: String, cookie: actix_web::cookie::Cookie<'static>| {
        test::TestRequest::post().uri(&uri).cookie(cookie).to_request()
    };

    let resp = test::call_service(&app, post(format!("/admin/delete_user/{bob_id}"), ada.clone())).await;
    assert_eq!(flash_message(&resp), "Only the Super Admin can delete users.");
    let resp = test::call_service(&app, post(format!("/admin/promote_user/{bob_id}"), ada.clone())).await;
    assert_eq!(
        flash_message(&resp),
        "Only the Super Admin can change administrative roles."
    );
    assert_eq!(h.store.find_user(bob_id).await.unwrap().unwrap().role, Role::User);

    for cookie in [root.clone(), ada.clone()] {
        let resp = test::call_service(&app, post("/admin/delete_user/1".into(), cookie.clone())).await;
        assert_eq!(flash_message(&resp), "Cannot delete the Super Admin user.");
        let resp = test::call_service(&app, post("/admin/demote_user/1".into(), cookie)).await;
        assert_eq!(flash_message(&resp), "Cannot demote the Super Admin.");
    }

    let resp = test::call_service(&app, post(format!("/admin/demote_user/{bob_id}"), root.clone())).await;
    assert_eq!(flash_message(&resp), "User 'bob@x.com' is not an admin.");

    let resp = test::call_service(&app, post(format!("/admin/demote_user/{ada_id}"), root.clone())).await;
    assert!(flash_message(&resp).contains("demoted successfully"));

    // The demoted admin's next request sees the new role.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/");

    let resp = test::call_service(&app, post(format!("/admin/delete_user/{bob_id}"), root.clone())).await;
    assert_eq!(flash_message(&resp), "User 'bob@x.com' deleted successfully!");
    assert!(h.store.find_user(bob_id).await.unwrap().is_none());

    let resp = test::call_service(&app, post(format!("/admin/delete_user/{bob_id}"), root)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admins_cannot_edit_the_super_admin_record() {
    let h = food_harness(ScriptedGateway::default());
    seed_user(&h.store, "root", Role::SuperAdmin).await;
    seed_user(&h.store, "ada", Role::Admin).await;
    let bob_id = seed_user(&h.store, "bob", Role::User).await;
    let app = test::init_service(App::new().app_data(h.state.clone()).configure(routes)).await;
    let ada = session(&test::call_service(&app, login_request("ada@x.com", "p1").to_request()).await);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/edit_user/1")
            .cookie(ada.clone())
            .set_form([("phone", "07099999999"), ("email", "mine@x.com")])
            .to_request(),
    )
    .await;
    assert_eq!(
        flash_message(&resp),
        "Access denied. Only the Super Admin can edit Super Admin details."
    );
    assert_eq!(h.store.find_user(1).await.unwrap().unwrap().email, "root@x.com");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/edit_user/{bob_id}"))
            .cookie(ada.clone())
            .set_form([
                ("phone", "07011111111"),
                ("email", "robert@x.com"),
                ("is_admin", "on"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/admin/dashboard");
    let bob = h.store.find_user(bob_id).await.unwrap().unwrap();
    assert_eq!(bob.email, "robert@x.com");
    assert_eq!(bob.role, Role::User);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/admin/edit_user/{bob_id}"))
            .cookie(ada)
            .to_request(),
    )
    .await;
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["users"]["email"], "robert@x.com");
    assert!(page["users"].get("password_hash").is_none());
}
