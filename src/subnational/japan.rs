//! Embedded prefecture attributes of Japan, keyed by the JIS prefecture
//! number (1 to 47) used as feature id by the boundary file.

pub(crate) struct Prefecture {
    pub name: &'static str,
    pub capital: &'static str,
    pub region: &'static str,
    pub population: u32,
    /// km².
    pub area: f64,
    pub flag: &'static str,
}

pub(crate) const PREFECTURES: [Prefecture; 47] = [
    Prefecture {
        name: "Hokkaido",
        capital: "Sapporo",
        region: "Hokkaido",
        population: 5_224_614,
        area: 83457.00,
        flag: "https://upload.wikimedia.org/wikipedia/commons/2/22/Flag_of_Hokkaido_Prefecture.svg",
    },
    Prefecture {
        name: "Aomori",
        capital: "Aomori",
        region: "Tohoku",
        population: 1_237_984,
        area: 9644.55,
        flag: "https://upload.wikimedia.org/wikipedia/commons/3/30/Flag_of_Aomori_Prefecture.svg",
    },
    Prefecture {
        name: "Iwate",
        capital: "Morioka",
        region: "Tohoku",
        population: 1_210_534,
        area: 15278.89,
        flag: "https://upload.wikimedia.org/wikipedia/commons/a/a9/Flag_of_Iwate_Prefecture.svg",
    },
    Prefecture {
        name: "Miyagi",
        capital: "Sendai",
        region: "Tohoku",
        population: 2_301_996,
        area: 7285.77,
        flag: "https://upload.wikimedia.org/wikipedia/commons/c/c7/Flag_of_Miyagi_Prefecture.svg",
    },
    Prefecture {
        name: "Akita",
        capital: "Akita",
        region: "Tohoku",
        population: 959_502,
        area: 11636.28,
        flag: "https://upload.wikimedia.org/wikipedia/commons/8/84/Flag_of_Akita_Prefecture.svg",
    },
    Prefecture {
        name: "Yamagata",
        capital: "Yamagata",
        region: "Tohoku",
        population: 1_068_027,
        area: 9323.46,
        flag: "https://upload.wikimedia.org/wikipedia/commons/a/a1/Flag_of_Yamagata_Prefecture.svg",
    },
    Prefecture {
        name: "Fukushima",
        capital: "Fukushima",
        region: "Tohoku",
        population: 1_833_152,
        area: 13782.76,
        flag: "https://upload.wikimedia.org/wikipedia/commons/4/4b/Flag_of_Fukushima_Prefecture.svg",
    },
    Prefecture {
        name: "Ibaraki",
        capital: "Mito",
        region: "Kanto",
        population: 2_867_009,
        area: 6095.72,
        flag: "https://upload.wikimedia.org/wikipedia/commons/a/a8/Flag_of_Ibaraki_Prefecture.svg",
    },
    Prefecture {
        name: "Tochigi",
        capital: "Utsunomiya",
        region: "Kanto",
        population: 1_933_146,
        area: 6408.28,
        flag: "https://upload.wikimedia.org/wikipedia/commons/d/d5/Flag_of_Tochigi_Prefecture.svg",
    },
    Prefecture {
        name: "Gunma",
        capital: "Maebashi",
        region: "Kanto",
        population: 1_939_110,
        area: 6362.33,
        flag: "https://upload.wikimedia.org/wikipedia/commons/b/ba/Flag_of_Gunma_Prefecture.svg",
    },
    Prefecture {
        name: "Saitama",
        capital: "Saitama",
        region: "Kanto",
        population: 7_344_765,
        area: 3798.08,
        flag: "https://upload.wikimedia.org/wikipedia/commons/c/cd/Flag_of_Saitama_Prefecture.svg",
    },
    Prefecture {
        name: "Chiba",
        capital: "Chiba",
        region: "Kanto",
        population: 6_284_480,
        area: 5156.61,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/0a/Flag_of_Chiba_Prefecture.svg",
    },
    Prefecture {
        name: "Tokyo",
        capital: "Shinjuku",
        region: "Kanto",
        population: 14_047_594,
        area: 2188.67,
        flag: "https://upload.wikimedia.org/wikipedia/commons/1/15/Flag_of_Tokyo_Metropolis.svg",
    },
    Prefecture {
        name: "Kanagawa",
        capital: "Yokohama",
        region: "Kanto",
        population: 9_237_337,
        area: 2415.86,
        flag: "https://upload.wikimedia.org/wikipedia/commons/a/a7/Flag_of_Kanagawa_Prefecture.svg",
    },
    Prefecture {
        name: "Niigata",
        capital: "Niigata",
        region: "Chubu",
        population: 2_201_272,
        area: 12583.83,
        flag: "https://upload.wikimedia.org/wikipedia/commons/c/cb/Flag_of_Niigata_Prefecture.svg",
    },
    Prefecture {
        name: "Toyama",
        capital: "Toyama",
        region: "Chubu",
        population: 1_034_814,
        area: 4247.61,
        flag: "https://upload.wikimedia.org/wikipedia/commons/1/1d/Flag_of_Toyama_Prefecture.svg",
    },
    Prefecture {
        name: "Ishikawa",
        capital: "Kanazawa",
        region: "Chubu",
        population: 1_132_852,
        area: 4185.67,
        flag: "https://upload.wikimedia.org/wikipedia/commons/6/6a/Flag_of_Ishikawa_Prefecture.svg",
    },
    Prefecture {
        name: "Fukui",
        capital: "Fukui",
        region: "Chubu",
        population: 766_863,
        area: 4189.88,
        flag: "https://upload.wikimedia.org/wikipedia/commons/5/56/Flag_of_Fukui_Prefecture.svg",
    },
    Prefecture {
        name: "Yamanashi",
        capital: "Kofu",
        region: "Chubu",
        population: 809_974,
        area: 4465.37,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/00/Flag_of_Yamanashi_Prefecture.svg",
    },
    Prefecture {
        name: "Nagano",
        capital: "Nagano",
        region: "Chubu",
        population: 2_048_011,
        area: 13562.23,
        flag: "https://upload.wikimedia.org/wikipedia/commons/f/f0/Flag_of_Nagano_Prefecture.svg",
    },
    Prefecture {
        name: "Gifu",
        capital: "Gifu",
        region: "Chubu",
        population: 1_978_742,
        area: 10621.17,
        flag: "https://upload.wikimedia.org/wikipedia/commons/3/3e/Flag_of_Gifu_Prefecture.svg",
    },
    Prefecture {
        name: "Shizuoka",
        capital: "Shizuoka",
        region: "Chubu",
        population: 3_633_202,
        area: 7780.50,
        flag: "https://upload.wikimedia.org/wikipedia/commons/9/92/Flag_of_Shizuoka_Prefecture.svg",
    },
    Prefecture {
        name: "Aichi",
        capital: "Nagoya",
        region: "Chubu",
        population: 7_542_415,
        area: 5165.12,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/02/Flag_of_Aichi_Prefecture.svg",
    },
    Prefecture {
        name: "Mie",
        capital: "Tsu",
        region: "Kansai",
        population: 1_770_254,
        area: 5777.31,
        flag: "https://upload.wikimedia.org/wikipedia/commons/8/8c/Flag_of_Mie_Prefecture.svg",
    },
    Prefecture {
        name: "Shiga",
        capital: "Otsu",
        region: "Kansai",
        population: 1_413_610,
        area: 4017.36,
        flag: "https://upload.wikimedia.org/wikipedia/commons/9/99/Flag_of_Shiga_Prefecture.svg",
    },
    Prefecture {
        name: "Kyoto",
        capital: "Kyoto",
        region: "Kansai",
        population: 2_578_087,
        area: 4613.21,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/06/Flag_of_Kyoto_Prefecture.svg",
    },
    Prefecture {
        name: "Osaka",
        capital: "Osaka",
        region: "Kansai",
        population: 8_837_685,
        area: 1899.28,
        flag: "https://upload.wikimedia.org/wikipedia/commons/5/5a/Flag_of_Osaka_Prefecture.svg",
    },
    Prefecture {
        name: "Hyogo",
        capital: "Kobe",
        region: "Kansai",
        population: 5_465_002,
        area: 8396.16,
        flag: "https://upload.wikimedia.org/wikipedia/commons/7/74/Flag_of_Hyogo_Prefecture.svg",
    },
    Prefecture {
        name: "Nara",
        capital: "Nara",
        region: "Kansai",
        population: 1_324_473,
        area: 3691.09,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/00/Flag_of_Nara_Prefecture.svg",
    },
    Prefecture {
        name: "Wakayama",
        capital: "Wakayama",
        region: "Kansai",
        population: 922_584,
        area: 4726.29,
        flag: "https://upload.wikimedia.org/wikipedia/commons/6/6e/Flag_of_Wakayama_Prefecture.svg",
    },
    Prefecture {
        name: "Tottori",
        capital: "Tottori",
        region: "Chugoku",
        population: 553_407,
        area: 3507.28,
        flag: "https://upload.wikimedia.org/wikipedia/commons/1/1c/Flag_of_Tottori_Prefecture.svg",
    },
    Prefecture {
        name: "Shimane",
        capital: "Matsue",
        region: "Chugoku",
        population: 671_126,
        area: 6707.96,
        flag: "https://upload.wikimedia.org/wikipedia/commons/e/e8/Flag_of_Shimane_Prefecture.svg",
    },
    Prefecture {
        name: "Okayama",
        capital: "Okayama",
        region: "Chugoku",
        population: 1_888_432,
        area: 7113.23,
        flag: "https://upload.wikimedia.org/wikipedia/commons/3/33/Flag_of_Okayama_Prefecture.svg",
    },
    Prefecture {
        name: "Hiroshima",
        capital: "Hiroshima",
        region: "Chugoku",
        population: 2_799_702,
        area: 8479.70,
        flag: "https://upload.wikimedia.org/wikipedia/commons/e/ed/Flag_of_Hiroshima_Prefecture.svg",
    },
    Prefecture {
        name: "Yamaguchi",
        capital: "Yamaguchi",
        region: "Chugoku",
        population: 1_342_059,
        area: 6114.09,
        flag: "https://upload.wikimedia.org/wikipedia/commons/b/b9/Flag_of_Yamaguchi_Prefecture.svg",
    },
    Prefecture {
        name: "Tokushima",
        capital: "Tokushima",
        region: "Shikoku",
        population: 719_559,
        area: 4146.74,
        flag: "https://upload.wikimedia.org/wikipedia/commons/a/ac/Flag_of_Tokushima_Prefecture.svg",
    },
    Prefecture {
        name: "Kagawa",
        capital: "Takamatsu",
        region: "Shikoku",
        population: 950_244,
        area: 1876.55,
        flag: "https://upload.wikimedia.org/wikipedia/commons/2/29/Flag_of_Kagawa_Prefecture.svg",
    },
    Prefecture {
        name: "Ehime",
        capital: "Matsuyama",
        region: "Shikoku",
        population: 1_344_841,
        area: 5678.33,
        flag: "https://upload.wikimedia.org/wikipedia/commons/2/2d/Flag_of_Ehime_Prefecture.svg",
    },
    Prefecture {
        name: "Kochi",
        capital: "Kochi",
        region: "Shikoku",
        population: 691_527,
        area: 7105.16,
        flag: "https://upload.wikimedia.org/wikipedia/commons/5/50/Flag_of_Kochi_Prefecture.svg",
    },
    Prefecture {
        name: "Fukuoka",
        capital: "Fukuoka",
        region: "Kyushu",
        population: 5_135_214,
        area: 4978.51,
        flag: "https://upload.wikimedia.org/wikipedia/commons/7/71/Flag_of_Fukuoka_Prefecture.svg",
    },
    Prefecture {
        name: "Saga",
        capital: "Saga",
        region: "Kyushu",
        population: 811_442,
        area: 2439.65,
        flag: "https://upload.wikimedia.org/wikipedia/commons/1/18/Flag_of_Saga_Prefecture.svg",
    },
    Prefecture {
        name: "Nagasaki",
        capital: "Nagasaki",
        region: "Kyushu",
        population: 1_312_317,
        area: 4105.47,
        flag: "https://upload.wikimedia.org/wikipedia/commons/6/65/Flag_of_Nagasaki_Prefecture.svg",
    },
    Prefecture {
        name: "Kumamoto",
        capital: "Kumamoto",
        region: "Kyushu",
        population: 1_738_301,
        area: 7404.79,
        flag: "https://upload.wikimedia.org/wikipedia/commons/f/f7/Flag_of_Kumamoto_Prefecture.svg",
    },
    Prefecture {
        name: "Oita",
        capital: "Oita",
        region: "Kyushu",
        population: 1_123_852,
        area: 6339.74,
        flag: "https://upload.wikimedia.org/wikipedia/commons/c/c8/Flag_of_Oita_Prefecture.svg",
    },
    Prefecture {
        name: "Miyazaki",
        capital: "Miyazaki",
        region: "Kyushu",
        population: 1_069_576,
        area: 7735.99,
        flag: "https://upload.wikimedia.org/wikipedia/commons/0/0b/Flag_of_Miyazaki_Prefecture.svg",
    },
    Prefecture {
        name: "Kagoshima",
        capital: "Kagoshima",
        region: "Kyushu",
        population: 1_588_256,
        area: 9188.82,
        flag: "https://upload.wikimedia.org/wikipedia/commons/c/c5/Flag_of_Kagoshima_Prefecture.svg",
    },
    Prefecture {
        name: "Okinawa",
        capital: "Naha",
        region: "Kyushu",
        population: 1_467_480,
        area: 2276.49,
        flag: "https://upload.wikimedia.org/wikipedia/commons/2/2f/Flag_of_Okinawa_Prefecture.svg",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_follow_prefecture_numbering() {
        assert_eq!(PREFECTURES[0].region, "Hokkaido");
        assert_eq!(PREFECTURES[12].name, "Tokyo");
        assert_eq!(PREFECTURES[12].region, "Kanto");
        assert_eq!(PREFECTURES[26].name, "Osaka");
        assert_eq!(PREFECTURES[26].region, "Kansai");
        assert_eq!(PREFECTURES[46].region, "Kyushu");
    }
}
