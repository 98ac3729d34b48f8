use ::common::storage::filesystem::{DEFAULT_IMAGE, DEFAULT_IMAGE_PNG};

use crate::common::{DEFAULT_IMAGE_BYTES, TestApp, empty_file, file, form, routes};

mod region_creation {
    use super::*;

    #[tokio::test]
    async fn save_then_get_returns_title_cased_name() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("nombre", "  región metropolitana "), ("active", "0")]),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["respuesta"], "Región guardada");

        let id = app.region_id("Región Metropolitana").await;
        let res = app.get(&routes::region(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["mensaje"], "Región obtenida");
        assert_eq!(res.body["region"]["idregion"], id);
        assert_eq!(res.body["region"]["nombre"], "Región Metropolitana");
        assert_eq!(res.body["region"]["active"], 0);
        assert!(res.body["region"]["url"].is_null());
    }

    #[tokio::test]
    async fn duplicate_name_in_any_casing_is_already_registered() {
        let app = TestApp::spawn().await;
        app.create_region("Santiago").await;

        for nombre in ["Santiago", "santiago", "SANTIAGO", " santiago "] {
            let res = app
                .post_form(routes::REGIONS, form(&[("nombre", nombre)]))
                .await;
            res.assert_error("Región ya ha sido registrada anteriormente");
        }
    }

    #[tokio::test]
    async fn explicit_id_is_honoured_and_cannot_be_reused() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("idregion", "13"), ("nombre", "Metropolitana")]),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Región guardada", "{}", res.text);
        assert_eq!(app.region_id("Metropolitana").await, 13);

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("idregion", "13"), ("nombre", "Valparaiso")]),
            )
            .await;
        res.assert_error("Región ya ha sido registrada anteriormente");
    }

    #[tokio::test]
    async fn missing_or_invalid_fields_are_bad_request() {
        let app = TestApp::spawn().await;

        let res = app.post_form(routes::REGIONS, form(&[("active", "1")])).await;
        assert_eq!(res.status, 400);

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("nombre", "Metro"), ("idregion", "trece")]),
            )
            .await;
        assert_eq!(res.status, 400);

        let long = "x".repeat(26);
        let res = app.post_form(routes::REGIONS, form(&[("nombre", &long)])).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["respuesta"], "error");
    }

    #[tokio::test]
    async fn get_unknown_region_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::region(999)).await;
        res.assert_error("Región no encontrada");
    }
}

mod region_images {
    use super::*;

    #[tokio::test]
    async fn png_upload_is_stored_and_served() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("nombre", "Maule")]).part("imagen", file("maule.png", b"maule png")),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Región guardada", "{}", res.text);

        let id = app.region_id("Maule").await;
        assert!(app.image_file("region", id, ".png").exists());

        let res = app.get(&routes::region(id)).await;
        assert_eq!(res.body["region"]["url"], ".png");

        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.status, 200);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"maule png");
    }

    #[tokio::test]
    async fn unsupported_extension_is_silently_ignored() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("nombre", "Biobio")]).part("imagen", file("biobio.gif", b"gif")),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Región guardada", "{}", res.text);

        let id = app.region_id("Biobio").await;
        let res = app.get(&routes::region(id)).await;
        assert!(res.body["region"]["url"].is_null());
        assert_eq!(app.image_count("region"), 0);
    }

    #[tokio::test]
    async fn region_without_image_serves_default() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Atacama").await;

        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.status, 200);
        assert_eq!(image.bytes, DEFAULT_IMAGE_BYTES);

        let image = app.get_image(&routes::region_image(404)).await;
        assert_eq!(image.bytes, DEFAULT_IMAGE_BYTES);
    }

    #[tokio::test]
    async fn builtin_default_is_served_without_default_file() {
        let app = TestApp::spawn().await;
        std::fs::remove_file(app.media_dir.join(DEFAULT_IMAGE)).unwrap();
        let id = app.create_region("Sur").await;

        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.status, 200);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, DEFAULT_IMAGE_PNG);
    }

    #[tokio::test]
    async fn missing_file_is_cleared_on_read() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("nombre", "Aysen")]).part("imagen", file("aysen.jpg", b"aysen")),
        )
        .await;
        let id = app.region_id("Aysen").await;

        std::fs::remove_file(app.image_file("region", id, ".jpg")).unwrap();

        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.status, 200);
        assert_eq!(image.bytes, DEFAULT_IMAGE_BYTES);

        let res = app.get(&routes::region(id)).await;
        assert!(res.body["region"]["url"].is_null(), "{}", res.text);
    }

    #[tokio::test]
    async fn empty_file_part_counts_as_no_image() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::REGIONS,
                form(&[("nombre", "Los Lagos")]).part("imagen", empty_file()),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Región guardada", "{}", res.text);
        assert_eq!(app.image_count("region"), 0);
    }
}

mod region_update {
    use super::*;

    #[tokio::test]
    async fn only_present_fields_change() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Tarapaca").await;

        let res = app
            .put_form(&routes::region(id), form(&[("active", "0")]))
            .await;
        assert_eq!(res.body["respuesta"], "Región actualizada", "{}", res.text);

        let res = app.get(&routes::region(id)).await;
        assert_eq!(res.body["region"]["nombre"], "Tarapaca");
        assert_eq!(res.body["region"]["active"], 0);

        let res = app
            .put_form(&routes::region(id), form(&[("nombre", "arica y parinacota")]))
            .await;
        assert_eq!(res.body["respuesta"], "Región actualizada", "{}", res.text);

        let res = app.get(&routes::region(id)).await;
        assert_eq!(res.body["region"]["nombre"], "Arica Y Parinacota");
        assert_eq!(res.body["region"]["active"], 0);
    }

    #[tokio::test]
    async fn renaming_to_own_name_is_allowed() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Coquimbo").await;

        let res = app
            .put_form(&routes::region(id), form(&[("nombre", "COQUIMBO")]))
            .await;
        assert_eq!(res.body["respuesta"], "Región actualizada", "{}", res.text);
    }

    #[tokio::test]
    async fn renaming_onto_another_region_is_already_registered() {
        let app = TestApp::spawn().await;
        app.create_region("Ohiggins").await;
        let id = app.create_region("Nuble").await;

        let res = app
            .put_form(&routes::region(id), form(&[("nombre", "ohiggins")]))
            .await;
        res.assert_error("Región ya ha sido registrada anteriormente");
    }

    #[tokio::test]
    async fn replacing_image_with_other_extension_removes_old_file() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("nombre", "Magallanes")]).part("imagen", file("a.png", b"old")),
        )
        .await;
        let id = app.region_id("Magallanes").await;

        let res = app
            .put_form(
                &routes::region(id),
                reqwest::multipart::Form::new().part("imagen", file("b.jpg", b"new")),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Región actualizada", "{}", res.text);

        assert!(!app.image_file("region", id, ".png").exists());
        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.bytes, b"new");
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn new_id_moves_row_and_image() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("idregion", "3"), ("nombre", "Antofagasta")])
                .part("imagen", file("a.png", b"antofagasta")),
        )
        .await;

        let res = app
            .put_form(&routes::region(3), form(&[("idregion", "2")]))
            .await;
        assert_eq!(res.body["respuesta"], "Región actualizada", "{}", res.text);

        app.get(&routes::region(3)).await.assert_error("Región no encontrada");
        let res = app.get(&routes::region(2)).await;
        assert_eq!(res.body["region"]["nombre"], "Antofagasta");
        assert!(app.image_file("region", 2, ".png").exists());
        assert!(!app.image_file("region", 3, ".png").exists());
    }

    #[tokio::test]
    async fn updating_unknown_region_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app
            .put_form(&routes::region(77), form(&[("nombre", "Nada")]))
            .await;
        res.assert_error("Región no encontrada");
    }
}

mod region_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_image() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("nombre", "Araucania")]).part("imagen", file("a.png", b"araucania")),
        )
        .await;
        let id = app.region_id("Araucania").await;
        assert!(app.image_file("region", id, ".png").exists());

        let res = app.delete(&routes::region(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["respuesta"], "ok");
        assert_eq!(res.mensaje(), "Región ha sido eliminada");

        assert!(!app.image_file("region", id, ".png").exists());
        app.get(&routes::region(id)).await.assert_error("Región no encontrada");

        let image = app.get_image(&routes::region_image(id)).await;
        assert_eq!(image.bytes, DEFAULT_IMAGE_BYTES);
    }

    #[tokio::test]
    async fn delete_region_with_comunas_cannot_delete() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Biobio").await;
        app.create_comuna(id, "Concepcion").await;

        let res = app.delete(&routes::region(id)).await;
        res.assert_error("Región no puede ser eliminada");

        let res = app.get(&routes::region(id)).await;
        assert_eq!(res.body["region"]["nombre"], "Biobio");
        let res = app.get(&routes::region_comunas(id)).await;
        assert_eq!(res.body["comunas"][0]["nombre"], "Concepcion");
    }

    #[tokio::test]
    async fn image_removal_failure_does_not_fail_delete() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("nombre", "Maule")]).part("imagen", file("m.png", b"maule")),
        )
        .await;
        let id = app.region_id("Maule").await;

        // A directory in place of the image file makes the unlink fail.
        let path = app.image_file("region", id, ".png");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let res = app.delete(&routes::region(id)).await;
        assert_eq!(res.body["respuesta"], "ok", "{}", res.text);
        assert_eq!(res.mensaje(), "Región ha sido eliminada");
        app.get(&routes::region(id)).await.assert_error("Región no encontrada");
    }

    #[tokio::test]
    async fn delete_unknown_region_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.delete(&routes::region(5)).await;
        res.assert_error("Región no encontrada");
    }

    #[tokio::test]
    async fn delete_all_on_empty_store_succeeds() {
        let app = TestApp::spawn().await;

        let res = app.delete(routes::REGIONS).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["respuesta"], "ok");
        assert_eq!(res.mensaje(), "Registros han sido eliminados");
        assert_eq!(app.image_count("region"), 0);
        assert_eq!(app.image_count("comuna"), 0);
    }

    #[tokio::test]
    async fn delete_all_wipes_records_and_images() {
        let app = TestApp::spawn().await;
        app.post_form(
            routes::REGIONS,
            form(&[("nombre", "Los Rios")]).part("imagen", file("r.png", b"r")),
        )
        .await;
        let region_id = app.region_id("Los Rios").await;
        app.post_form(
            routes::COMUNAS,
            form(&[("idregion", &region_id.to_string()), ("nombre", "Valdivia")])
                .part("imagen", file("c.jpg", b"c")),
        )
        .await;
        assert_eq!(app.image_count("region"), 1);
        assert_eq!(app.image_count("comuna"), 1);

        let res = app.delete(routes::REGIONS).await;
        assert_eq!(res.body["respuesta"], "ok", "{}", res.text);

        assert_eq!(app.image_count("region"), 0);
        assert_eq!(app.image_count("comuna"), 0);
        let res = app.get(routes::REGIONS).await;
        assert_eq!(res.body["mensaje"], "No hay regiones ni comunas disponibles");
    }
}

mod region_listing {
    use super::*;

    #[tokio::test]
    async fn empty_listing_reports_no_data() {
        let app = TestApp::spawn().await;
        let res = app.get(routes::REGIONS).await;
        assert_eq!(res.status, 200);
        assert_eq!(
            res.body,
            serde_json::json!({ "mensaje": "No hay regiones ni comunas disponibles" })
        );
    }

    #[tokio::test]
    async fn listing_includes_comuna_names_and_pages() {
        let app = TestApp::spawn().await;
        let metro = app.create_region("Metropolitana").await;
        app.create_comuna(metro, "Santiago").await;
        app.create_comuna(metro, "Providencia").await;
        app.create_region("Valparaiso").await;

        let res = app.get(routes::REGIONS).await;
        assert_eq!(res.body["mensaje"], "Regiones y comunas obtenidas");
        assert_eq!(res.body["total"], 2);
        assert_eq!(res.body["limit"], 1000);
        assert_eq!(res.body["offset"], 0);

        let regiones = res.body["regiones"].as_array().unwrap();
        assert_eq!(regiones.len(), 2);
        assert_eq!(regiones[0]["region"]["nombre"], "Metropolitana");
        assert_eq!(
            regiones[0]["comunas"],
            serde_json::json!(["Santiago", "Providencia"])
        );
        assert_eq!(regiones[1]["comunas"], serde_json::json!([]));

        let res = app.get("/region?limit=1&offset=1").await;
        let regiones = res.body["regiones"].as_array().unwrap();
        assert_eq!(regiones.len(), 1);
        assert_eq!(regiones[0]["region"]["nombre"], "Valparaiso");
        assert_eq!(res.body["total"], 2);
    }

    #[tokio::test]
    async fn region_comunas_are_paged() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Metropolitana").await;
        for nombre in ["Santiago", "Providencia", "Maipu"] {
            app.create_comuna(id, nombre).await;
        }

        let res = app
            .get(&format!("{}?limit=2&offset=1", routes::region_comunas(id)))
            .await;
        assert_eq!(res.body["mensaje"], "Región y comunas obtenidas", "{}", res.text);
        assert_eq!(res.body["region"]["nombre"], "Metropolitana");
        assert_eq!(res.body["total"], 3);
        let comunas = res.body["comunas"].as_array().unwrap();
        assert_eq!(comunas.len(), 2);
        assert_eq!(comunas[0]["nombre"], "Providencia");
        assert_eq!(comunas[1]["nombre"], "Maipu");
        assert_eq!(comunas[0]["idregion"], id);
    }

    #[tokio::test]
    async fn comunas_of_unknown_region_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::region_comunas(12)).await;
        res.assert_error("Región no encontrada");
    }
}

mod region_comuna_import {
    use super::*;

    #[tokio::test]
    async fn names_are_saved_and_repeats_reported() {
        let app = TestApp::spawn().await;
        let metro = app.create_region("Metropolitana").await;
        let other = app.create_region("Valparaiso").await;
        app.create_comuna(other, "Maipu").await;

        let res = app
            .post_form(
                &routes::region_comunas(metro),
                form(&[("request", r#"["la florida", "maipu", "nunoa"]"#)])
                    .part("imagenes[]", file("0.png", b"florida"))
                    .part("imagenes[]", file("1.png", b"maipu"))
                    .part("imagenes[]", file("2.png", b"nunoa")),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body,
            serde_json::json!({
                "respuesta": "Se han guardado 2 comunas",
                "comunas_repetidas": "Maipu",
            })
        );

        let nunoa = app.comuna_id("Nunoa").await;
        let image = app.get_image(&routes::comuna_image(nunoa)).await;
        assert_eq!(image.bytes, b"nunoa");

        let res = app.get(&routes::comuna(app.comuna_id("maipu").await)).await;
        assert_eq!(res.body["comuna"]["idregion"], other);
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app
            .post_form(
                &routes::region_comunas(40),
                form(&[("request", r#"["Lampa"]"#)]),
            )
            .await;
        res.assert_error("Región no encontrada");
    }

    #[tokio::test]
    async fn malformed_request_is_bad_request() {
        let app = TestApp::spawn().await;
        let id = app.create_region("Metropolitana").await;
        let res = app
            .post_form(
                &routes::region_comunas(id),
                form(&[("request", r#"{"comunas": ["Lampa"]}"#)]),
            )
            .await;
        assert_eq!(res.status, 400);
    }
}
