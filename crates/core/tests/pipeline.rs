use fii_core::config::Settings;
use fii_core::domain::FundType;
use fii_core::reconcile::Pipeline;
use std::path::Path;

const PRIMARY_HEADER: &str = "Ticker,P/VP,Dividend Yield,Tipo,Dados Obtidos,Cotação,Liquidez Diária,Variação 12M,Público Alvo,Segmento,Tipo de Gestão,Taxa de Administração,Vacância,Número de Cotistas,Cotas Emitidas,Valor Patrimonial,Último Rendimento,Qtd de imóveis,Valor de Mercado,Data Atualização";

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

fn settings(dir: &Path) -> Settings {
    Settings {
        source_tz: Some(chrono_tz::UTC),
        ..Settings::default().with_data_dir(dir)
    }
}

fn write_primary(dir: &Path) {
    let body = format!(
        "{PRIMARY_HEADER}\n{}\n{}\n{}\n",
        "AAAA11,0.95,10.5,Fundo de tijolo,True,100.0,1500000.0,-2.5,fii.GENERAL,Híbrido,fii.PASSIVE,\"0,60% a.a.\",5.0,12000,1000,95000.0,0.9,0,0,2024-01-15 10:30:00",
        "BBBB11,0.80,12.0,Fundo de papel,False,90.0,,,,,,,,,,,,,,2024-01-15 10:30:00",
        "CCCC11,1.10,8.0,Fundo de papel,True,10.0,200000.0,1.0,fii.QUALIFIED_INVESTOR,Títulos e Valores Mobiliários,fii.ACTIVE,\"1,00% a.a.\",0,3000,0,,0.08,5,55000000.0,2024-01-15 09:00:00",
    );
    write(dir, "investidor10_fiis.csv", &body);
}

fn write_secondaries(dir: &Path) {
    write(
        dir,
        "fundamentus_fiis.csv",
        "Papel,Qtd de imóveis,Valor de Mercado,Data Atualização\nAAAA11,12,99000.0,2024-01-14 08:00:00\nCCCC11,9,1.0,2024-01-15 11:00:00\nZZZZ11,4,1.0,2024-01-15 11:00:00\n",
    );
    write(
        dir,
        "ward_fiis.csv",
        "Ticker,Segmento\nAAAA11,Logístico\nCCCC11,Shoppings\n",
    );
}

#[test]
fn end_to_end_filters_and_recomputes_market_cap() {
    let dir = tempfile::tempdir().unwrap();
    write_primary(dir.path());

    let table = Pipeline::from_settings(&settings(dir.path()))
        .unwrap()
        .run_funds()
        .unwrap();

    let tickers: Vec<_> = table.iter().map(|r| r.ticker.as_str()).collect();
    assert!(!tickers.contains(&"BBBB11"));
    assert_eq!(table.len(), 2);

    let a = table.get("AAAA11").unwrap();
    assert_eq!(a.market_cap, 100_000.0);
    assert!((a.last_yield - 0.9).abs() < 1e-9);
    assert_eq!(a.management_type, "Passiva");
    assert_eq!(a.target_audience, "Geral");
    assert_eq!(a.management_fee, "0,60% a.a.");
    // Híbrido with no alternate label collapses to the synonym.
    assert_eq!(a.segment, "Outros");
    assert_eq!(a.properties_count, 0);
    assert_eq!(
        a.last_updated.unwrap().to_rfc3339(),
        "2024-01-15T07:30:00-03:00"
    );

    let c = table.get("CCCC11").unwrap();
    assert_eq!(c.segment, "Títulos e Val. Mob.");
    assert_eq!(c.fund_type, FundType::Papel);
    assert_eq!(c.market_cap, 55_000_000.0);
    assert_eq!(c.target_audience, "Investidor Qualificado");
}

#[test]
fn secondaries_fill_gaps_and_override_low_confidence_segments() {
    let dir = tempfile::tempdir().unwrap();
    write_primary(dir.path());
    write_secondaries(dir.path());

    let table = Pipeline::from_settings(&settings(dir.path()))
        .unwrap()
        .run_funds()
        .unwrap();

    assert!(table.get("ZZZZ11").is_none());

    let a = table.get("AAAA11").unwrap();
    assert_eq!(a.properties_count, 12);
    assert_eq!(a.market_cap, 100_000.0);
    assert_eq!(a.segment, "Logística");
    assert_eq!(a.fund_type, FundType::Tijolo);
    // Stalest contributor wins: the secondary row from the day before.
    assert_eq!(
        a.last_updated.unwrap().to_rfc3339(),
        "2024-01-14T05:00:00-03:00"
    );

    let c = table.get("CCCC11").unwrap();
    assert_eq!(c.properties_count, 5);
    assert_eq!(c.segment, "Títulos e Val. Mob.");
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_primary(dir.path());
    write_secondaries(dir.path());

    let pipeline = Pipeline::from_settings(&settings(dir.path())).unwrap();
    let first = pipeline.run_funds().unwrap();
    let second = pipeline.run_funds().unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_secondary_degrades_to_primary_only() {
    let dir = tempfile::tempdir().unwrap();
    write_primary(dir.path());
    write(dir.path(), "fundamentus_fiis.csv", "Codigo,Qtd de imóveis\nAAAA11,12\n");

    let table = Pipeline::from_settings(&settings(dir.path()))
        .unwrap()
        .run_funds()
        .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("AAAA11").unwrap().properties_count, 0);
}

#[test]
fn communications_and_last_update_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_primary(dir.path());
    write(
        dir.path(),
        "communications.csv",
        concat!(
            "Ticker,CNPJ,Categoria,Tipo,Data de Referência,Data de Entrega,Status,Versão,Data Atualização\n",
            "CCCC11,2,Relatórios,Informe Mensal,12/2023,10/01/2024 09:00,Ativo,1,2024-01-16 12:00:00\n",
            "AAAA11,1,Relatórios,Informe Mensal,12/2023,10/01/2024 09:00,Ativo,1,2024-01-16 12:00:00\n",
            "AAAA11,1,Relatórios,Informe Mensal,12/2023,10/01/2024 09:00,Ativo,2,2024-01-16 12:00:00\n",
        ),
    );

    let pipeline = Pipeline::from_settings(&settings(dir.path())).unwrap();
    let comms = pipeline.run_communications().unwrap();
    let order: Vec<_> = comms.iter().map(|c| (c.ticker.as_str(), c.version)).collect();
    assert_eq!(order, vec![("AAAA11", 2), ("AAAA11", 1), ("CCCC11", 1)]);
    assert_eq!(comms.records()[0].reference_date_display(), "2023/12/31");
    assert_eq!(comms.records()[0].reference_month, "Dezembro");

    // Funds are older (09:00 UTC on the 15th) than the filings.
    assert_eq!(pipeline.last_update(), "15/01/2024 06h00min");
}

#[test]
fn dividends_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_settings(&settings(dir.path())).unwrap();
    assert!(pipeline.run_dividends().unwrap().is_empty());
    assert!(pipeline.run_communications().is_err());
}
