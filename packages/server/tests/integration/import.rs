use serde_json::json;

use crate::common::{TestApp, empty_file, file, form, routes};

fn batch(value: serde_json::Value) -> reqwest::multipart::Form {
    form(&[("request", &value.to_string())])
}

mod json_import {
    use super::*;

    #[tokio::test]
    async fn saves_regions_and_comunas_with_positional_images() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "metropolitana", "comunas": ["santiago", "providencia"]},
                    {"region": "valparaiso", "comunas": ["vina del mar"]},
                ]))
                .part("imagenes_reg[]", file("r0.png", b"region 0"))
                .part("imagenes_reg[]", file("r1.jpg", b"region 1"))
                .part("imagenes_com[]", file("c0.png", b"comuna 0"))
                .part("imagenes_com[]", file("c1.png", b"comuna 1"))
                .part("imagenes_com[]", file("c2.jpg", b"comuna 2")),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body,
            json!({
                "respuesta": "Se han guardado 3 comunas y 2 regiones",
                "comunas_repetidas": "",
                "regiones_repetidas": "",
            })
        );

        let metro = app.region_id("Metropolitana").await;
        let valpo = app.region_id("Valparaiso").await;
        assert_eq!(app.get_image(&routes::region_image(metro)).await.bytes, b"region 0");
        assert_eq!(app.get_image(&routes::region_image(valpo)).await.bytes, b"region 1");

        for (name, bytes) in [
            ("Santiago", b"comuna 0"),
            ("Providencia", b"comuna 1"),
            ("Vina Del Mar", b"comuna 2"),
        ] {
            let id = app.comuna_id(name).await;
            assert_eq!(app.get_image(&routes::comuna_image(id)).await.bytes, bytes);
        }

        let res = app.get(&routes::comuna(app.comuna_id("Vina Del Mar").await)).await;
        assert_eq!(res.body["comuna"]["region"], "Valparaiso");
    }

    #[tokio::test]
    async fn repeated_comuna_still_consumes_its_image_slot() {
        let app = TestApp::spawn().await;
        let existing = app.create_region("Existing").await;
        app.create_comuna(existing, "X").await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "A", "comunas": ["x", "y"]},
                    {"region": "B", "comunas": ["z"]},
                ]))
                .part("imagenes_com[]", file("img0.png", b"img0"))
                .part("imagenes_com[]", file("img1.png", b"img1"))
                .part("imagenes_com[]", file("img2.png", b"img2")),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["comunas_repetidas"], "X");
        assert_eq!(res.body["respuesta"], "Se han guardado 2 comunas y 2 regiones");

        let y = app.comuna_id("Y").await;
        let z = app.comuna_id("Z").await;
        assert_eq!(app.get_image(&routes::comuna_image(y)).await.bytes, b"img1");
        assert_eq!(app.get_image(&routes::comuna_image(z)).await.bytes, b"img2");

        // The pre-existing comuna keeps its region and gains no image.
        let x = app.comuna_id("X").await;
        let res = app.get(&routes::comuna(x)).await;
        assert_eq!(res.body["comuna"]["idregion"], existing);
        assert!(res.body["comuna"]["url"].is_null());
    }

    #[tokio::test]
    async fn repeated_region_skips_all_its_comunas_and_their_images() {
        let app = TestApp::spawn().await;
        app.create_region("Metro").await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "metro", "comunas": ["santiago", "nunoa"]},
                    {"region": "valpo", "comunas": ["santiago"]},
                ]))
                .part("imagenes_reg[]", file("r0.png", b"r0"))
                .part("imagenes_reg[]", file("r1.png", b"r1"))
                .part("imagenes_com[]", file("c0.png", b"c0"))
                .part("imagenes_com[]", file("c1.png", b"c1"))
                .part("imagenes_com[]", file("c2.png", b"c2")),
            )
            .await;
        assert_eq!(
            res.body,
            json!({
                "respuesta": "Se han guardado 1 comunas y 1 regiones",
                "comunas_repetidas": "Santiago, Nunoa",
                "regiones_repetidas": "Metro",
            })
        );

        let valpo = app.region_id("Valpo").await;
        assert_eq!(app.get_image(&routes::region_image(valpo)).await.bytes, b"r1");

        let santiago = app.comuna_id("Santiago").await;
        let res = app.get(&routes::comuna(santiago)).await;
        assert_eq!(res.body["comuna"]["idregion"], valpo);
        assert_eq!(app.get_image(&routes::comuna_image(santiago)).await.bytes, b"c2");
    }

    #[tokio::test]
    async fn summary_counts_subtract_duplicates() {
        let app = TestApp::spawn().await;
        let dup_region = app.create_region("Duplicada").await;
        app.create_comuna(dup_region, "Repetida").await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "duplicada", "comunas": ["repetida"]},
                    {"region": "nueva", "comunas": ["dos", "tres"]},
                ])),
            )
            .await;
        assert_eq!(
            res.body,
            json!({
                "respuesta": "Se han guardado 2 comunas y 1 regiones",
                "comunas_repetidas": "Repetida",
                "regiones_repetidas": "Duplicada",
            })
        );

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "otra", "comunas": ["repetida", "cuatro"]},
                    {"region": "duplicada", "comunas": ["cinco"]},
                ])),
            )
            .await;
        assert_eq!(
            res.body,
            json!({
                "respuesta": "Se han guardado 1 comunas y 1 regiones",
                "comunas_repetidas": "Repetida, Cinco",
                "regiones_repetidas": "Duplicada",
            })
        );
    }

    #[tokio::test]
    async fn duplicates_within_one_batch_are_detected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([
                    {"region": "norte", "comunas": ["arica", "ARICA"]},
                    {"region": "NORTE", "comunas": []},
                ])),
            )
            .await;
        assert_eq!(
            res.body,
            json!({
                "respuesta": "Se han guardado 1 comunas y 1 regiones",
                "comunas_repetidas": "Arica",
                "regiones_repetidas": "Norte",
            })
        );
    }

    #[tokio::test]
    async fn gaps_and_short_image_lists_leave_entities_without_images() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::IMPORT_JSON,
                batch(json!([{"region": "sur", "comunas": ["a", "b", "c"]}]))
                    .part("imagenes_com[]", file("0.png", b"a"))
                    .part("imagenes_com[]", empty_file()),
            )
            .await;
        assert_eq!(res.body["respuesta"], "Se han guardado 3 comunas y 1 regiones", "{}", res.text);

        let a = app.comuna_id("A").await;
        assert_eq!(app.get_image(&routes::comuna_image(a)).await.bytes, b"a");
        assert_eq!(app.image_count("comuna"), 1);
        assert_eq!(app.image_count("region"), 0);
    }

    #[tokio::test]
    async fn malformed_batches_are_rejected_before_any_write() {
        let app = TestApp::spawn().await;

        for request in [
            json!({"region": "a", "comunas": []}),
            json!([{"region": "a"}]),
            json!([{"region": "a", "comunas": [], "extra": true}]),
            json!([{"region": "", "comunas": []}]),
            json!([{"region": "a", "comunas": ["this name is far too long to store"]}]),
        ] {
            let res = app.post_form(routes::IMPORT_JSON, batch(request)).await;
            assert_eq!(res.status, 400, "{}", res.text);
        }

        let res = app.post_form(routes::IMPORT_JSON, form(&[])).await;
        assert_eq!(res.status, 400);

        let res = app.get(routes::REGIONS).await;
        assert_eq!(res.body["mensaje"], "No hay regiones ni comunas disponibles");
    }
}

mod csv_import {
    use super::*;

    #[tokio::test]
    async fn groups_lines_by_region() {
        let app = TestApp::spawn().await;
        let csv = "region;comuna\nmetro;santiago\nmetro;providencia\nvalpo;vina\n";

        let res = app
            .post_form(
                routes::IMPORT_CSV,
                reqwest::multipart::Form::new()
                    .part("request", file("regiones.csv", csv.as_bytes()))
                    .part("imagenes_com[]", file("0.png", b"santiago"))
                    .part("imagenes_com[]", file("1.png", b"providencia"))
                    .part("imagenes_com[]", file("2.png", b"vina")),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["respuesta"], "Se han guardado 3 comunas y 2 regiones");

        let res = app.get(routes::REGIONS).await;
        let regiones = res.body["regiones"].as_array().unwrap();
        assert_eq!(regiones[0]["region"]["nombre"], "Metro");
        assert_eq!(regiones[0]["comunas"], json!(["Santiago", "Providencia"]));
        assert_eq!(regiones[1]["region"]["nombre"], "Valpo");
        assert_eq!(regiones[1]["comunas"], json!(["Vina"]));

        let vina = app.comuna_id("Vina").await;
        assert_eq!(app.get_image(&routes::comuna_image(vina)).await.bytes, b"vina");
    }

    #[tokio::test]
    async fn wrong_extension_is_invalid_file() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::IMPORT_CSV,
                reqwest::multipart::Form::new()
                    .part("request", file("regiones.txt", b"region;comuna\nmetro;santiago\n")),
            )
            .await;
        res.assert_error("Archivo inválido");

        let res = app.get(routes::REGIONS).await;
        assert_eq!(res.body["mensaje"], "No hay regiones ni comunas disponibles");
    }

    #[tokio::test]
    async fn missing_file_is_bad_request() {
        let app = TestApp::spawn().await;
        let res = app
            .post_form(routes::IMPORT_CSV, form(&[("request", "metro;santiago")]))
            .await;
        assert_eq!(res.status, 400);
    }
}
