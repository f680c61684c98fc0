use super::*;

fn doc(html: &str) -> Html {
    Html::parse_document(html)
}

fn rate_block(title: Option<&str>, rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(r#"<div class="block block-views clearfix">"#);
    if let Some(title) = title {
        html.push_str(&format!(r#"<h2 class="block-title">{title}</h2>"#));
    }
    for (plan, kind, price) in rows {
        html.push_str(&format!(
            r#"<div class="views-row">
                 <div class="views-field-title"><span class="field-content"><a href="/p">{plan}</a></span></div>
                 <div class="col-field-tarifa-tipo"><span class="field-content">{kind}</span></div>
                 <div class="col-field-tarifa-precio-billing-price"><span class="field-content">{price}</span></div>
               </div>"#
        ));
    }
    html.push_str("</div>");
    html
}

fn rates_page(blocks: &[String]) -> String {
    format!(
        r#"<html><body><section class="space-rates">{}</section></body></html>"#,
        blocks.concat()
    )
}

#[test]
fn empty_page_yields_all_sentinel_record() {
    let record = parse_detail("<html><body></body></html>");

    assert_eq!(record, DetailRecord::default());
    assert!(record.is_well_formed());
    assert_eq!(record.found_count(), 0);
}

#[test]
fn description_prefers_encoded_body_and_joins_lines() {
    let html = r#"<div class="field-name-body">
        <div class="field-item even">Fallback text</div>
        <div class="field-item even" property="content:encoded">
          <p> Espacio luminoso </p>
          <p></p>
          <p>en el <strong>Eixample</strong></p>
        </div>
    </div>"#;

    assert_eq!(
        description(&doc(html)).as_deref(),
        Some("Espacio luminoso\nen el\nEixample")
    );
}

#[test]
fn description_falls_back_to_plain_body_item() {
    let html = r#"<div class="field-name-body"><div class="field-item even"> Solo texto </div></div>"#;

    assert_eq!(description(&doc(html)).as_deref(), Some("Solo texto"));
}

#[test]
fn contact_fields_read_from_space_info() {
    let html = r#"<div class="space-info">
        <div class="field-name-field-coworking-address"><div class="field-item even">
          Carrer de Pallars, 108 <br> 08018 Barcelona
        </div></div>
        <div class="field-name-field-coworking-telefono"><div class="field-item even"> 932 123 456 </div></div>
        <div class="field-name-field-coworking-web"><div class="field-item even">
          <a href="https://hub.example.com">hub.example.com</a>
        </div></div>
    </div>"#;
    let doc = doc(html);

    assert_eq!(
        address(&doc).as_deref(),
        Some("Carrer de Pallars, 10808018 Barcelona")
    );
    assert_eq!(phone(&doc).as_deref(), Some("932 123 456"));
    assert_eq!(website(&doc).as_deref(), Some("https://hub.example.com"));
}

#[test]
fn contact_fields_outside_space_info_are_ignored() {
    let html = r#"<div class="field-name-field-coworking-telefono"><div class="field-item even">600</div></div>"#;

    assert_eq!(phone(&doc(html)), None);
}

#[test]
fn website_anchor_without_href_is_missing() {
    let html = r#"<div class="space-info"><div class="field-name-field-coworking-web">
        <div class="field-item even"><a>sin enlace</a></div></div></div>"#;

    assert_eq!(website(&doc(html)), None);
}

#[test]
fn services_come_from_block_after_heading() {
    let html = r#"<div>
        <h2 class="field-label">Otros</h2>
        <div class="field-items"><span class="term-name">Ignorado</span></div>
        <h2 class="field-label">Servicios</h2>
        <p>separador</p>
        <div class="field-items">
          <span class="term-name"> Wifi </span>
          <span class="term-name"></span>
          <span class="term-name">Café</span>
        </div>
    </div>"#;

    assert_eq!(services(&doc(html)).as_deref(), Some("Wifi; Café"));
}

#[test]
fn services_heading_without_items_is_missing() {
    let html = r#"<div><h2 class="field-label">Servicios</h2></div>"#;

    assert_eq!(services(&doc(html)), None);
}

#[test]
fn basic_metrics_route_by_keyword() {
    let html = r#"<div class="space-info"><div class="basic-info clearfix">
        <div class="info-item"><span class="info-item-label">Superficie</span><span class="info-item-value">450 m²</span></div>
        <div class="info-item"><span class="info-item-label">Despachos privados</span><span class="info-item-value">6</span></div>
        <div class="info-item"><span class="info-item-label">Salas de reuniones</span><span class="info-item-value">2</span></div>
        <div class="info-item"><span class="info-item-label">CAPACIDAD</span><span class="info-item-value">80</span></div>
        <div class="info-item"><span class="info-item-label">Horario</span><span class="info-item-value">24h</span></div>
    </div></div>"#;

    let metrics = basic_metrics(&doc(html));

    assert_eq!(metrics.surface_area.as_deref(), Some("450 m²"));
    assert_eq!(metrics.private_offices.as_deref(), Some("6"));
    assert_eq!(metrics.meeting_rooms_count.as_deref(), Some("2"));
    assert_eq!(metrics.capacity.as_deref(), Some("80"));
}

#[test]
fn earlier_keyword_wins_within_one_label() {
    let html = r#"<div class="space-info"><div class="basic-info clearfix">
        <div class="info-item"><span class="info-item-label">Capacidad de salas</span><span class="info-item-value">12</span></div>
    </div></div>"#;

    let metrics = basic_metrics(&doc(html));

    assert_eq!(metrics.meeting_rooms_count.as_deref(), Some("12"));
    assert_eq!(metrics.capacity, None);
}

#[test]
fn later_item_overwrites_same_field() {
    let html = r#"<div class="space-info"><div class="basic-info clearfix">
        <div class="info-item"><span class="info-item-label">Superficie</span><span class="info-item-value">100 m²</span></div>
        <div class="info-item"><span class="info-item-label">Superficie útil</span><span class="info-item-value">90 m²</span></div>
    </div></div>"#;

    assert_eq!(
        basic_metrics(&doc(html)).surface_area.as_deref(),
        Some("90 m²")
    );
}

#[test]
fn item_missing_value_is_skipped() {
    let html = r#"<div class="space-info"><div class="basic-info clearfix">
        <div class="info-item"><span class="info-item-label">Capacidad</span></div>
    </div></div>"#;

    assert_eq!(basic_metrics(&doc(html)), BasicMetrics::default());
}

#[test]
fn two_blocks_of_two_rows_give_four_segments_in_order() {
    let html = rates_page(&[
        rate_block(
            Some("Tarifas de Coworking"),
            &[("Flex", "Mensual", "150 €"), ("Fijo", "Mensual", "200 €")],
        ),
        rate_block(
            Some("Tarifas de Despachos"),
            &[("Despacho 2", "Mensual", "600 €"), ("Despacho 4", "Mensual", "1.000 €")],
        ),
    ]);

    let formatted = format_prices(&price_rows(&doc(&html))).unwrap();
    let segments: Vec<&str> = formatted.split(" || ").collect();

    assert_eq!(
        segments,
        vec![
            "Category: Coworking, Plan: Flex, Price: 150 €",
            "Category: Coworking, Plan: Fijo, Price: 200 €",
            "Category: Despachos, Plan: Despacho 2, Price: 600 €",
            "Category: Despachos, Plan: Despacho 4, Price: 1.000 €",
        ]
    );
}

#[test]
fn untitled_block_is_unknown_category_and_missing_cells_are_sentinel() {
    let html = rates_page(&[String::from(
        r#"<div class="block block-views clearfix">
             <div class="views-row">
               <div class="col-field-tarifa-pase-tipo"><span class="field-content">Día</span></div>
             </div>
           </div>"#,
    )]);

    let rows = price_rows(&doc(&html));

    assert_eq!(
        rows,
        vec![PriceRow {
            category: "Unknown".to_string(),
            plan: "N/A".to_string(),
            kind: "Día".to_string(),
            price: "N/A".to_string(),
        }]
    );
    assert_eq!(
        format_prices(&rows).as_deref(),
        Some("Category: Unknown, Plan: N/A, Price: N/A")
    );
}

#[test]
fn no_rate_blocks_means_no_prices() {
    assert!(price_rows(&doc("<section class=\"space-rates\"></section>")).is_empty());
    assert_eq!(format_prices(&[]), None);
}

#[test]
fn image_url_comes_from_first_gallery_link() {
    let html = r#"<div class="photoswipe-gallery">
        <a class="photoswipe">sin href</a>
        <a class="photoswipe" href="https://cdn.example.com/1.jpg">1</a>
        <a class="photoswipe" href="https://cdn.example.com/2.jpg">2</a>
    </div>"#;

    assert_eq!(
        image_url(&doc(html)).as_deref(),
        Some("https://cdn.example.com/1.jpg")
    );
}

#[test]
fn full_page_populates_every_field() {
    let html = format!(
        r#"<html><body>
        <div class="field-name-body"><div class="field-item even" property="content:encoded"><p>Un espacio.</p></div></div>
        <div class="space-info">
          <div class="field-name-field-coworking-address"><div class="field-item even">Gran Via 1</div></div>
          <div class="field-name-field-coworking-telefono"><div class="field-item even">930000000</div></div>
          <div class="field-name-field-coworking-web"><div class="field-item even"><a href="https://a.example">a</a></div></div>
          <div class="basic-info clearfix">
            <div class="info-item"><span class="info-item-label">Superficie</span><span class="info-item-value">300 m²</span></div>
            <div class="info-item"><span class="info-item-label">Despachos</span><span class="info-item-value">4</span></div>
            <div class="info-item"><span class="info-item-label">Salas</span><span class="info-item-value">1</span></div>
            <div class="info-item"><span class="info-item-label">Capacidad</span><span class="info-item-value">40</span></div>
          </div>
        </div>
        <h2 class="field-label">Servicios</h2>
        <div class="field-items"><span class="term-name">Wifi</span></div>
        <section class="space-rates">{}</section>
        <div class="photoswipe-gallery"><a class="photoswipe" href="https://img.example/x.jpg">x</a></div>
        </body></html>"#,
        rate_block(Some("Tarifas de Coworking"), &[("Flex", "Mensual", "99 €")])
    );

    let record = parse_detail(&html);

    assert_eq!(record.found_count(), 11);
    assert_eq!(record.description, "Un espacio.");
    assert_eq!(record.services_list, "Wifi");
    assert_eq!(
        record.detailed_prices,
        "Category: Coworking, Plan: Flex, Price: 99 €"
    );
    assert_eq!(record.capacity, "40");
    assert_eq!(record.image_url, "https://img.example/x.jpg");
}

#[test]
fn blank_values_become_sentinel() {
    let html = r#"<div class="space-info">
        <div class="field-name-field-coworking-telefono"><div class="field-item even">   </div></div>
        <div class="basic-info clearfix">
          <div class="info-item"><span class="info-item-label">Capacidad</span><span class="info-item-value"> </span></div>
        </div>
    </div>"#;

    let record = parse_detail(html);

    assert_eq!(record.phone, "N/A");
    assert_eq!(record.capacity, "N/A");
    assert!(record.is_well_formed());
}
