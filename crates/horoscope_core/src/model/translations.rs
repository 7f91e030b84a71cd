//! Localized UI strings.
//!
//! Every front-end (Flutter shell, CLI) renders from these tables so the same
//! words appear everywhere, including the error strings that services write
//! into result slots.

use serde::Serialize;

use super::language::Language;

/// All user-visible strings for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translations {
    pub page_title: &'static str,
    pub sign_calculator: &'static str,
    pub birth_chart_calculator: &'static str,
    pub enter_birth_date: &'static str,
    pub calculate_sign: &'static str,
    pub calculating: &'static str,
    pub your_sign: &'static str,
    pub sign_details: &'static str,

    pub home: &'static str,
    pub birth_chart: &'static str,

    pub enter_birth_details: &'static str,
    pub birth_location: &'static str,
    pub search_by_city: &'static str,
    pub enter_coordinates: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub selected: &'static str,
    pub language: &'static str,
    pub calculate_roast_chart: &'static str,
    pub generating: &'static str,
    pub generating_roast: &'static str,
    pub waiting_for_roast: &'static str,
    pub ascendant: &'static str,

    pub get_horoscope_roast: &'static str,
    pub enter_sign: &'static str,
    pub get_roast: &'static str,
    pub loading: &'static str,
    pub horoscope: &'static str,

    pub today: &'static str,
    pub tomorrow: &'static str,
    pub yesterday: &'static str,
    pub this_week: &'static str,
    pub this_month: &'static str,

    pub element: &'static str,
    pub quality: &'static str,
    pub ruler: &'static str,
    pub dates: &'static str,
    pub traits: &'static str,

    pub search_birth_city: &'static str,
    pub searching: &'static str,

    pub error_calculating_sign: &'static str,
    pub error_fetching_roast: &'static str,
    pub invalid_birth_details: &'static str,
    pub error_calculating_chart: &'static str,

    pub birth_chart_wheel: &'static str,
    pub house: &'static str,
    /// Connector in "Sun in Gemini".
    pub in_sign: &'static str,

    pub love: &'static str,
    pub work: &'static str,
    pub social: &'static str,
    pub overall: &'static str,

    pub select_sign: &'static str,
}

impl Translations {
    pub fn for_language(language: Language) -> &'static Translations {
        match language {
            Language::English => &ENGLISH,
            Language::French => &FRENCH,
            Language::Russian => &RUSSIAN,
        }
    }
}

static ENGLISH: Translations = Translations {
    page_title: "(brutally) Honest horoscope",
    sign_calculator: "Sign Calculator",
    birth_chart_calculator: "Birth Chart Calculator",
    enter_birth_date: "Enter your birth date",
    calculate_sign: "Calculate Sign",
    calculating: "Calculating...",
    your_sign: "Your Sign",
    sign_details: "Sign Details",
    home: "Home",
    birth_chart: "Birth Chart",
    enter_birth_details: "Enter Your Birth Details",
    birth_location: "Birth Location",
    search_by_city: "Search by City",
    enter_coordinates: "Enter Coordinates",
    latitude: "Latitude",
    longitude: "Longitude",
    selected: "Selected",
    language: "Language",
    calculate_roast_chart: "Calculate & Roast Chart",
    generating: "Channeling...",
    generating_roast: "Interpreting star patterns...",
    waiting_for_roast: "Waiting for magic ball's response...",
    ascendant: "Ascendant",
    get_horoscope_roast: "Get Your Honest Horoscope",
    enter_sign: "Enter sign (or use calculated sign above)",
    get_roast: "Get Roast",
    loading: "Loading...",
    horoscope: "Horoscope",
    today: "Today",
    tomorrow: "Tomorrow",
    yesterday: "Yesterday",
    this_week: "This Week",
    this_month: "This Month",
    element: "Element",
    quality: "Quality",
    ruler: "Ruler",
    dates: "Dates",
    traits: "Traits",
    search_birth_city: "Search for your birth city...",
    searching: "Searching...",
    error_calculating_sign: "Error calculating sign",
    error_fetching_roast: "Error fetching roast",
    invalid_birth_details: "Please check your birth date, time and coordinates",
    error_calculating_chart: "Error calculating birth chart",
    birth_chart_wheel: "Birth Chart Wheel",
    house: "House",
    in_sign: "in",
    love: "Love",
    work: "Work",
    social: "Social Life",
    overall: "Overall",
    select_sign: "Select a zodiac sign",
};

static FRENCH: Translations = Translations {
    page_title: "Horoscope (un peu trop) Honnête",
    sign_calculator: "Calculateur de Signe",
    birth_chart_calculator: "Calculateur de Thème Astral",
    enter_birth_date: "Entrez votre date de naissance",
    calculate_sign: "Calculer le Signe",
    calculating: "Calcul...",
    your_sign: "Votre Signe",
    sign_details: "Détails du Signe",
    home: "Accueil",
    birth_chart: "Thème Astral",
    enter_birth_details: "Entrez vos détails de naissance",
    birth_location: "Lieu de naissance",
    search_by_city: "Rechercher par ville",
    enter_coordinates: "Entrer les coordonnées",
    latitude: "Latitude",
    longitude: "Longitude",
    selected: "Sélectionné",
    language: "Langue",
    calculate_roast_chart: "Calculer",
    generating: "Génération...",
    generating_roast: "Lecture des étoiles...",
    waiting_for_roast: "En attente d'une réponse de la boule de cristal...",
    ascendant: "Ascendant",
    get_horoscope_roast: "Obtenez votre Horoscope Honnête",
    enter_sign: "Entrez le signe (ou utilisez le signe calculé ci-dessus)",
    get_roast: "Calculer",
    loading: "Chargement...",
    horoscope: "Horoscope",
    today: "Aujourd'hui",
    tomorrow: "Demain",
    yesterday: "Hier",
    this_week: "Cette Semaine",
    this_month: "Ce Mois",
    element: "Élément",
    quality: "Qualité",
    ruler: "Maître",
    dates: "Dates",
    traits: "Traits",
    search_birth_city: "Recherchez votre ville de naissance...",
    searching: "Recherche...",
    error_calculating_sign: "Erreur de calcul du signe",
    error_fetching_roast: "Erreur lors de la lecture des étoiles",
    invalid_birth_details: "Vérifiez votre date, heure et coordonnées de naissance",
    error_calculating_chart: "Erreur lors du calcul du thème natal",
    birth_chart_wheel: "Roue du Thème Astral",
    house: "Maison",
    in_sign: "en",
    love: "Amour",
    work: "Travail",
    social: "Vie Sociale",
    overall: "Global",
    select_sign: "Sélectionnez un signe du zodiaque",
};

static RUSSIAN: Translations = Translations {
    page_title: "Гороскоп без фильтров",
    sign_calculator: "Узнайте свой знак",
    birth_chart_calculator: "Посчитайте свою Натальную Карту",
    enter_birth_date: "Введите дату рождения",
    calculate_sign: "Рассчитать знак",
    calculating: "Расчет...",
    your_sign: "Ваш Знак",
    sign_details: "Детали Знака",
    home: "Главная",
    birth_chart: "Натальная Карта",
    enter_birth_details: "Введите данные о вашем рождении",
    birth_location: "Место рождения",
    search_by_city: "Поиск по городу",
    enter_coordinates: "Ввести координаты",
    latitude: "Широта",
    longitude: "Долгота",
    selected: "Выбрано",
    language: "Язык",
    calculate_roast_chart: "Рассчитать карту",
    generating: "Генерация...",
    generating_roast: "Чтение звездных знаков...",
    waiting_for_roast: "Ожидание ответа от магического шара...",
    ascendant: "Асцендент",
    get_horoscope_roast: "Гороскоп без фильтров",
    enter_sign: "Введите знак (или используйте рассчитанный знак выше)",
    get_roast: "Скажи мне все как есть",
    loading: "Загрузка...",
    horoscope: "Гороскоп",
    today: "Сегодня",
    tomorrow: "Завтра",
    yesterday: "Вчера",
    this_week: "На неделю",
    this_month: "На месяц",
    element: "Элемент",
    quality: "Качество",
    ruler: "Управитель",
    dates: "Даты",
    traits: "Черты",
    search_birth_city: "Найдите свой город рождения...",
    searching: "Поиск...",
    error_calculating_sign: "Ошибка расчета знака",
    error_fetching_roast: "Ошибка чтения звездных знаков",
    invalid_birth_details: "Проверьте дату, время и координаты рождения",
    error_calculating_chart: "Ошибка при расчёте натальной карты",
    birth_chart_wheel: "Натальная Карта",
    house: "Дом",
    in_sign: "в",
    love: "Любовь",
    work: "Работа",
    social: "Социальная Жизнь",
    overall: "Общее",
    select_sign: "Выберите знак зодиака",
};

#[cfg(test)]
mod tests {
    use super::Translations;
    use crate::model::Language;

    #[test]
    fn each_language_has_its_own_error_strings() {
        let strings = Language::ALL
            .into_iter()
            .map(|language| Translations::for_language(language).error_fetching_roast)
            .collect::<Vec<_>>();
        assert_eq!(strings[0], "Error fetching roast");
        assert_ne!(strings[0], strings[1]);
        assert_ne!(strings[1], strings[2]);
    }
}
