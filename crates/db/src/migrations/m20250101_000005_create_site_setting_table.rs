//! Create site setting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Singleton: the application only ever reads and writes id = 1
        manager
            .create_table(
                Table::create()
                    .table(SiteSetting::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SiteSetting::Id).integer().not_null().primary_key())
                    .col(
                        ColumnDef::new(SiteSetting::SiteName)
                            .string_len(120)
                            .not_null()
                            .default("Aerodicionário"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::DefaultMetaDescription)
                            .text()
                            .not_null()
                            .default("Glossário de termos e siglas da aviação para estudantes e profissionais do setor aéreo."),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::DefaultOgImage)
                            .string_len(512)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SiteLogo)
                            .string_len(512)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::Favicon)
                            .string_len(512)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::PrimaryColor)
                            .string_len(7)
                            .not_null()
                            .default("#0e76e6"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SecondaryColor)
                            .string_len(7)
                            .not_null()
                            .default("#065ec0"),
                    )
                    .col(ColumnDef::new(SiteSetting::MetaKeywords).text().not_null().default(""))
                    .col(
                        ColumnDef::new(SiteSetting::MetaTitleSuffix)
                            .string_len(60)
                            .not_null()
                            .default(" - Aerodicionário"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::EnableIndexing)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SiteSetting::AnalyticsCode).text().not_null().default(""))
                    .col(
                        ColumnDef::new(SiteSetting::RobotsTxt)
                            .text()
                            .not_null()
                            .default("User-agent: *\nAllow: /\nSitemap: /sitemap.xml\n"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroTitle)
                            .string_len(200)
                            .not_null()
                            .default("Seu guia de termos e siglas da aviação"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroSubtitle)
                            .string_len(240)
                            .not_null()
                            .default("Da cabine de comando ao solo, descubra a linguagem que move o céu."),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroEyebrow)
                            .string_len(80)
                            .not_null()
                            .default("AERODICIONÁRIO"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroBadgeText)
                            .string_len(140)
                            .not_null()
                            .default("Simples, rápido e 100% gratuito."),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SearchPlaceholder)
                            .string_len(160)
                            .not_null()
                            .default("Buscar termos (ex.: IFR, NOTAM, APU)"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroImage)
                            .string_len(512)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::HeroImageAlt)
                            .string_len(150)
                            .not_null()
                            .default("Imagem de destaque"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::CtaPrimaryText)
                            .string_len(40)
                            .not_null()
                            .default("Consultar Dicionário"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::CtaPrimaryUrl)
                            .string_len(200)
                            .not_null()
                            .default("/dicionario/"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::CtaSecondaryText)
                            .string_len(40)
                            .not_null()
                            .default("Saiba mais"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::CtaSecondaryUrl)
                            .string_len(200)
                            .not_null()
                            .default("#sobre"),
                    )
                    .col(ColumnDef::new(SiteSetting::ItemsPerPage).integer().not_null().default(12))
                    .col(
                        ColumnDef::new(SiteSetting::EnableAutocomplete)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::AutocompleteThrottleMs)
                            .integer()
                            .not_null()
                            .default(1000),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SocialTwitter)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SocialInstagram)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SocialYoutube)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SocialLinkedin)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::FooterText)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SiteSetting::CustomCss).text().not_null().default(""))
                    .col(ColumnDef::new(SiteSetting::CustomJsHead).text().not_null().default(""))
                    .col(ColumnDef::new(SiteSetting::CustomJsBody).text().not_null().default(""))
                    .col(
                        ColumnDef::new(SiteSetting::SuggestionsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SuggestionsRequireSource)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SuggestionsMinJustification)
                            .integer()
                            .not_null()
                            .default(15),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SuggestionMaxImageMb)
                            .integer()
                            .not_null()
                            .default(6),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::SuggestionRateLimitSeconds)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(ColumnDef::new(SiteSetting::ShowAbout).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(SiteSetting::AboutTitle)
                            .string_len(120)
                            .not_null()
                            .default("Sobre o Aerodicionário"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::AboutHtml)
                            .text()
                            .not_null()
                            .default("<p>O Aerodicionário reúne definições claras e objetivas para estudantes, entusiastas e profissionais do setor aéreo.</p>"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::ShowFeatures)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::FeaturesTitle)
                            .string_len(120)
                            .not_null()
                            .default("Por que usar o Aerodicionário?"),
                    )
                    .col(
                        ColumnDef::new(SiteSetting::FeaturesHtml)
                            .text()
                            .not_null()
                            .default("<ul><li>Conteúdo atualizado</li><li>Busca rápida</li><li>Acesso gratuito</li></ul>"),
                    )
                    .col(ColumnDef::new(SiteSetting::ShowHow).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(SiteSetting::HowTitle)
                            .string_len(120)
                            .not_null()
                            .default("Como funciona"),
                    )
                    .col(ColumnDef::new(SiteSetting::HowHtml).text().not_null().default(""))
                    .col(ColumnDef::new(SiteSetting::ShowFaq).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(SiteSetting::FaqTitle)
                            .string_len(120)
                            .not_null()
                            .default("Perguntas frequentes"),
                    )
                    .col(ColumnDef::new(SiteSetting::FaqHtml).text().not_null().default(""))
                    .col(ColumnDef::new(SiteSetting::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteSetting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SiteSetting {
    Table,
    Id,
    SiteName,
    DefaultMetaDescription,
    DefaultOgImage,
    SiteLogo,
    Favicon,
    PrimaryColor,
    SecondaryColor,
    MetaKeywords,
    MetaTitleSuffix,
    EnableIndexing,
    AnalyticsCode,
    RobotsTxt,
    HeroTitle,
    HeroSubtitle,
    HeroEyebrow,
    HeroBadgeText,
    SearchPlaceholder,
    HeroImage,
    HeroImageAlt,
    CtaPrimaryText,
    CtaPrimaryUrl,
    CtaSecondaryText,
    CtaSecondaryUrl,
    ItemsPerPage,
    EnableAutocomplete,
    AutocompleteThrottleMs,
    SocialTwitter,
    SocialInstagram,
    SocialYoutube,
    SocialLinkedin,
    FooterText,
    CustomCss,
    CustomJsHead,
    CustomJsBody,
    SuggestionsEnabled,
    SuggestionsRequireSource,
    SuggestionsMinJustification,
    SuggestionMaxImageMb,
    SuggestionRateLimitSeconds,
    ShowAbout,
    AboutTitle,
    AboutHtml,
    ShowFeatures,
    FeaturesTitle,
    FeaturesHtml,
    ShowHow,
    HowTitle,
    HowHtml,
    ShowFaq,
    FaqTitle,
    FaqHtml,
    UpdatedAt,
}
