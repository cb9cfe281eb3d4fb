use crate::domain::FundType;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMappings {
    pub fund_type: BTreeMap<String, FundType>,
    pub segment_synonyms: BTreeMap<String, String>,
    pub segment_implies_type: BTreeMap<String, FundType>,
    pub low_confidence_segments: BTreeSet<String>,
    pub management_type: BTreeMap<String, String>,
    pub target_audience: BTreeMap<String, String>,
}

impl CategoryMappings {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read mappings file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("mappings file {} is not valid", path.display()))
    }

    pub fn fund_type(&self, raw: &str) -> FundType {
        let raw = raw.trim();
        self.fund_type
            .get(raw)
            .cloned()
            .unwrap_or_else(|| FundType::from_label(raw))
    }

    pub fn segment(&self, raw: &str) -> String {
        let raw = raw.trim();
        self.segment_synonyms
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    pub fn type_for_segment(&self, segment: &str) -> Option<&FundType> {
        self.segment_implies_type.get(segment)
    }

    pub fn is_low_confidence(&self, segment: &str) -> bool {
        self.low_confidence_segments.contains(segment.trim())
    }

    pub fn management_type(&self, raw: &str) -> String {
        lookup_or_pass(&self.management_type, raw)
    }

    pub fn target_audience(&self, raw: &str) -> String {
        lookup_or_pass(&self.target_audience, raw)
    }
}

fn lookup_or_pass(map: &BTreeMap<String, String>, raw: &str) -> String {
    let raw = raw.trim();
    map.get(raw).cloned().unwrap_or_else(|| raw.to_string())
}

fn pairs<V: Clone>(entries: &[(&str, V)]) -> BTreeMap<String, V> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

impl Default for CategoryMappings {
    fn default() -> Self {
        let fund_type = pairs(&[
            ("Fundo de tijolo", FundType::Tijolo),
            ("Fundo de papel", FundType::Papel),
            ("Fundo de desenvolvimento", FundType::Desenvolvimento),
            ("Fundo de fundos", FundType::Fundos),
            ("Fundo misto", FundType::Misto),
            ("-", FundType::Outro),
        ]);

        let segment_synonyms = pairs(&[
            ("Logístico / Indústria / Galpões", "Logística".to_string()),
            ("Logístico", "Logística".to_string()),
            ("Industrial", "Logística".to_string()),
            ("Shoppings / Varejo", "Shoppings".to_string()),
            ("Shopping", "Shoppings".to_string()),
            ("Varejo", "Renda Urbana".to_string()),
            ("Títulos e Valores Mobiliários", "Títulos e Val. Mob.".to_string()),
            ("Papel CRI", "Títulos e Val. Mob.".to_string()),
            ("Fundo de Infraestrutura (FI-Infra)", "FI-Infra".to_string()),
            ("Fundo de Investimentos em Participações (FIP)", "FIP".to_string()),
            ("Outro", "Outros".to_string()),
            ("Híbrido", "Outros".to_string()),
            ("Agências", "Agências Bancárias".to_string()),
            ("Agências bancárias", "Agências Bancárias".to_string()),
        ]);

        let segment_implies_type = pairs(&[
            ("Agrícola", FundType::Tijolo),
            ("Agências Bancárias", FundType::Tijolo),
            ("Cemitério", FundType::Tijolo),
            ("Desenvolvimento", FundType::Desenvolvimento),
            ("Educacional", FundType::Tijolo),
            ("FI-Infra", FundType::Outro),
            ("FIP", FundType::Outro),
            ("Fiagros", FundType::Outro),
            ("Fundo de Fundos", FundType::Fundos),
            ("Hospitalar", FundType::Tijolo),
            ("Hotéis", FundType::Tijolo),
            ("Lajes Corporativas", FundType::Tijolo),
            ("Logística", FundType::Tijolo),
            ("Renda Urbana", FundType::Tijolo),
            ("Residencial", FundType::Tijolo),
            ("Shoppings", FundType::Tijolo),
        ]);

        let low_confidence_segments = ["Outros", "Híbrido"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let management_type = pairs(&[
            ("Passive", "Passiva".to_string()),
            ("fii.PASSIVE", "Passiva".to_string()),
            ("Active", "Ativa".to_string()),
            ("fii.ACTIVE", "Ativa".to_string()),
        ]);

        let target_audience = pairs(&[
            ("fii.QUALIFIED_INVESTOR", "Investidor Qualificado".to_string()),
            ("fii.GENERAL", "Geral".to_string()),
        ]);

        Self {
            fund_type,
            segment_synonyms,
            segment_implies_type,
            low_confidence_segments,
            management_type,
            target_audience,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_site_tokens() {
        let m = CategoryMappings::default();
        assert_eq!(m.fund_type("Fundo de papel"), FundType::Papel);
        assert_eq!(m.fund_type("-"), FundType::Outro);
        assert_eq!(m.fund_type("Fundo de Tijolo"), FundType::Tijolo);
        assert_eq!(m.management_type("fii.ACTIVE"), "Ativa");
        assert_eq!(m.target_audience("fii.QUALIFIED_INVESTOR"), "Investidor Qualificado");
        assert_eq!(m.segment("Logístico / Indústria / Galpões"), "Logística");
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let m = CategoryMappings::default();
        assert_eq!(m.management_type("fii.HYBRID"), "fii.HYBRID");
        assert_eq!(m.segment("Data Centers"), "Data Centers");
        assert_eq!(
            m.fund_type("Fundo imobiliário"),
            FundType::Unmapped("Fundo imobiliário".to_string())
        );
    }

    #[test]
    fn mappings_round_trip_through_json() {
        let m = CategoryMappings::default();
        let text = serde_json::to_string(&m).unwrap();
        let back: CategoryMappings = serde_json::from_str(&text).unwrap();
        assert_eq!(back, m);
    }
}
